//! Raw, TOML-shaped configuration model. Every field the original
//! `target.json`/`.toml` payload could carry is represented here as
//! `Option`/`Vec`/`BTreeMap` with `#[serde(default)]`; structural validity
//! (types, required keys) is enforced by `serde` at deserialize time, so
//! [`crate::validate`] only needs to check the handful of rules serde's type
//! system can't express (non-empty strings, valid regexes, a fixed schema
//! version).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigRaw {
    #[serde(default)]
    pub policy: Option<PolicyRaw>,
    #[serde(default)]
    pub targets: BTreeMap<String, TargetRaw>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyRaw {
    pub max_allowed_classification: Option<String>,
    pub fail_on_warnings: Option<bool>,
    pub require_layout_probe: Option<bool>,
    #[serde(default)]
    pub rules: Vec<abi_guard_types::PolicyRule>,
    #[serde(default)]
    pub waivers: Vec<abi_guard_types::PolicyWaiver>,
    pub waiver_requirements: Option<WaiverRequirementsRaw>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaiverRequirementsRaw {
    pub require_owner: Option<bool>,
    pub require_reason: Option<bool>,
    pub require_expires_utc: Option<bool>,
    pub require_approved_by: Option<bool>,
    pub require_ticket: Option<bool>,
    pub max_ttl_days: Option<u64>,
    pub warn_expiring_within_days: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetRaw {
    #[serde(default)]
    pub baseline_path: Option<String>,
    pub header: HeaderRaw,
    #[serde(default)]
    pub bindings: Option<BindingsRaw>,
    #[serde(default)]
    pub policy: Option<PolicyRaw>,
    #[serde(default)]
    pub codegen: Option<CodegenRaw>,
    #[serde(default)]
    pub binary: Option<BinaryRaw>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionMacrosRaw {
    pub major: String,
    pub minor: String,
    pub patch: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypePolicyRaw {
    pub enable_enums: Option<bool>,
    pub enable_structs: Option<bool>,
    pub enum_name_pattern: Option<String>,
    pub struct_name_pattern: Option<String>,
    #[serde(default)]
    pub ignore_enums: Vec<String>,
    #[serde(default)]
    pub ignore_structs: Vec<String>,
    pub struct_tail_addition_is_breaking: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeaderParserRaw {
    pub backend: Option<String>,
    pub compiler: Option<String>,
    #[serde(default)]
    pub compiler_candidates: Vec<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub include_dirs: Vec<String>,
    pub fallback_to_regex: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutRaw {
    pub enable: Option<bool>,
    pub compiler: Option<String>,
    #[serde(default)]
    pub cflags: Vec<String>,
    #[serde(default)]
    pub include_dirs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderRaw {
    pub path: String,
    pub api_macro: String,
    pub call_macro: String,
    pub symbol_prefix: String,
    pub version_macros: VersionMacrosRaw,
    #[serde(default)]
    pub parser: Option<HeaderParserRaw>,
    #[serde(default)]
    pub types: Option<TypePolicyRaw>,
    #[serde(default)]
    pub layout: Option<LayoutRaw>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratorRaw {
    pub name: Option<String>,
    pub kind: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub command: Option<Vec<String>>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BindingsRaw {
    #[serde(default)]
    pub expected_symbols: Vec<String>,
    #[serde(default)]
    pub symbol_docs: BTreeMap<String, String>,
    #[serde(default)]
    pub deprecated_symbols: Vec<String>,
    #[serde(default)]
    pub generators: Vec<GeneratorRaw>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BinaryRaw {
    pub path: Option<String>,
    pub skip: Option<bool>,
    #[serde(default)]
    pub allow_non_prefixed_exports: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodegenRaw {
    pub enabled: Option<bool>,
    pub idl_output_path: Option<String>,
    pub native_header_output_path: Option<String>,
    pub native_export_map_output_path: Option<String>,
    pub native_header_guard: Option<String>,
    pub native_api_macro: Option<String>,
    pub native_call_macro: Option<String>,
    pub idl_schema_version: Option<u32>,
    #[serde(default)]
    pub include_symbols: Vec<String>,
    #[serde(default)]
    pub exclude_symbols: Vec<String>,
    #[serde(default)]
    pub include_symbols_regex: Vec<String>,
    #[serde(default)]
    pub exclude_symbols_regex: Vec<String>,
    #[serde(default)]
    pub native_constants: BTreeMap<String, String>,
}
