use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub tool: String,
    pub command: String,
    pub parse_format: String,
    pub export_count: usize,
}

/// Result of probing a compiled shared library for exported symbols.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinaryPayload {
    pub available: bool,
    pub path: Option<String>,
    pub tool: Option<String>,
    #[serde(default)]
    pub tools: Vec<ToolInvocation>,
    pub symbol_count: usize,
    pub symbols: Vec<String>,
    pub raw_export_count: usize,
    pub non_prefixed_export_count: usize,
    pub non_prefixed_exports: Vec<String>,
    pub allow_non_prefixed_exports: bool,
    #[serde(default)]
    pub decorated_export_count: usize,
    #[serde(default)]
    pub decorated_exports: Vec<String>,
    #[serde(default)]
    pub potential_calling_convention_mismatch: bool,
    #[serde(default)]
    pub export_tool_error_count: usize,
    #[serde(default)]
    pub export_tool_errors: Vec<String>,
    #[serde(default)]
    pub skipped: bool,
    pub reason: Option<String>,
}

impl BinaryPayload {
    #[must_use]
    pub fn not_configured() -> Self {
        Self {
            available: false,
            path: None,
            tool: None,
            tools: Vec::new(),
            symbol_count: 0,
            symbols: Vec::new(),
            raw_export_count: 0,
            non_prefixed_export_count: 0,
            non_prefixed_exports: Vec::new(),
            allow_non_prefixed_exports: true,
            decorated_export_count: 0,
            decorated_exports: Vec::new(),
            potential_calling_convention_mismatch: false,
            export_tool_error_count: 0,
            export_tool_errors: Vec::new(),
            skipped: true,
            reason: Some("not_configured".to_string()),
        }
    }

    #[must_use]
    pub fn explicit_skip() -> Self {
        let mut p = Self::not_configured();
        p.reason = Some("explicit_skip".to_string());
        p
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindingsPayload {
    pub available: bool,
    pub source: String,
    pub symbol_count: usize,
    pub symbols: Vec<String>,
}

impl BindingsPayload {
    #[must_use]
    pub fn not_configured() -> Self {
        Self {
            available: false,
            source: "not_configured".to_string(),
            symbol_count: 0,
            symbols: Vec::new(),
        }
    }
}
