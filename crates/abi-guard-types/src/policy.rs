use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

/// A predicate gate over a [`crate::report::Report`]: when `when` matches, the
/// rule's message is appended to the report's errors or warnings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRule {
    pub rule_id: String,
    pub enabled: bool,
    pub severity: Severity,
    pub message: String,
    pub when: RuleCondition,
}

/// `when` block of a [`PolicyRule`], deserialized straight from the config's
/// loosely-typed JSON object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleCondition {
    pub classification_in: Option<Vec<String>>,
    pub classification_not_in: Option<Vec<String>>,

    pub removed_symbols_count_gt: Option<u64>,
    pub added_symbols_count_gt: Option<u64>,
    pub changed_signatures_count_gt: Option<u64>,
    pub breaking_reasons_count_gt: Option<u64>,
    pub additive_reasons_count_gt: Option<u64>,
    pub warnings_count_gt: Option<u64>,
    pub errors_count_gt: Option<u64>,

    pub removed_symbols_regex_all: Option<Vec<String>>,
    pub added_symbols_regex_all: Option<Vec<String>>,
    pub changed_signatures_regex_all: Option<Vec<String>>,
    pub breaking_reasons_regex_all: Option<Vec<String>>,
    pub additive_reasons_regex_all: Option<Vec<String>>,
    pub warnings_regex_all: Option<Vec<String>>,
    pub errors_regex_all: Option<Vec<String>>,

    pub removed_symbols_regex_any: Option<Vec<String>>,
    pub added_symbols_regex_any: Option<Vec<String>>,
    pub changed_signatures_regex_any: Option<Vec<String>>,
    pub breaking_reasons_regex_any: Option<Vec<String>>,
    pub additive_reasons_regex_any: Option<Vec<String>>,
    pub warnings_regex_any: Option<Vec<String>>,
    pub errors_regex_any: Option<Vec<String>>,
}

/// A waiver that can suppress rule/diff messages matching `pattern` for
/// targets matching `targets`, subject to expiry and metadata requirements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyWaiver {
    pub waiver_id: String,
    /// Target-name regexes this waiver applies to; empty means "match all".
    pub targets: Vec<String>,
    /// "any", "error", or "warning".
    pub severity: String,
    pub pattern: String,
    pub expires_utc: Option<String>,
    pub created_utc: Option<String>,
    pub owner: Option<String>,
    pub reason: Option<String>,
    pub approved_by: Option<String>,
    pub ticket: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaiverRequirements {
    pub require_owner: bool,
    pub require_reason: bool,
    pub require_expires_utc: bool,
    pub require_approved_by: bool,
    pub require_ticket: bool,
    pub max_ttl_days: Option<u64>,
    pub warn_expiring_within_days: u64,
}

impl Default for WaiverRequirements {
    fn default() -> Self {
        Self {
            require_owner: false,
            require_reason: false,
            require_expires_utc: false,
            require_approved_by: false,
            require_ticket: false,
            max_ttl_days: None,
            warn_expiring_within_days: 30,
        }
    }
}

/// The resolved (root-merged-with-target) policy a [`PolicyRule`] set and
/// [`PolicyWaiver`] set is evaluated under, plus the global gates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectivePolicy {
    pub max_allowed_classification: String,
    pub fail_on_warnings: bool,
    pub require_layout_probe: bool,
    pub rules: Vec<PolicyRule>,
    pub waivers: Vec<PolicyWaiver>,
    pub waiver_requirements: WaiverRequirements,
}

impl Default for EffectivePolicy {
    fn default() -> Self {
        Self {
            max_allowed_classification: "breaking".to_string(),
            fail_on_warnings: false,
            require_layout_probe: false,
            rules: Vec::new(),
            waivers: Vec::new(),
            waiver_requirements: WaiverRequirements::default(),
        }
    }
}
