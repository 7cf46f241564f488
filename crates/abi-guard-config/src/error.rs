use camino::Utf8PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unable to read config file '{path}': {source}")]
    Read { path: Utf8PathBuf, source: std::io::Error },
    #[error("unable to parse config file '{path}' as TOML: {source}")]
    Parse { path: Utf8PathBuf, source: Box<toml::de::Error> },
    #[error("unable to parse config file '{path}' as JSON: {source}")]
    ParseJson { path: Utf8PathBuf, source: serde_json::Error },
    #[error("unable to serialize config file '{path}': {source}")]
    Serialize { path: Utf8PathBuf, source: serde_json::Error },
    #[error("unable to write config file '{path}': {source}")]
    Write { path: Utf8PathBuf, source: std::io::Error },
    #[error("config must define a non-empty 'targets' table")]
    NoTargets,
    #[error("target '{target}' is missing required field 'header.{field}'")]
    MissingHeaderField { target: String, field: &'static str },
    #[error("target '{target}'.{field} must be a non-empty string")]
    EmptyString { target: String, field: String },
    #[error("target '{target}'.codegen.idl_schema_version={found} is not supported; only {expected} is supported")]
    UnsupportedIdlSchemaVersion { target: String, found: u32, expected: u32 },
    #[error("invalid regex in target '{target}'.{field}: {source}")]
    InvalidRegex { target: String, field: String, source: regex::Error },
    #[error("target '{target}'.policy.max_allowed_classification must be none/additive/breaking")]
    InvalidClassification { target: String },
    #[error("target '{target}'.policy.waivers[{waiver_id}].{field} is required by waiver_requirements")]
    WaiverMissingField { target: String, waiver_id: String, field: &'static str },
    #[error("target '{target}'.policy.waivers[{waiver_id}].{field} is not a valid ISO timestamp: {value}")]
    WaiverInvalidTimestamp { target: String, waiver_id: String, field: &'static str, value: String },
    #[error("target '{target}'.policy.waivers[{waiver_id}] must include created_utc and expires_utc when max_ttl_days is configured")]
    WaiverMissingTtlFields { target: String, waiver_id: String },
    #[error("target '{target}'.policy.waivers[{waiver_id}] expires_utc is earlier than created_utc")]
    WaiverTtlInverted { target: String, waiver_id: String },
    #[error("target '{target}'.policy.waivers[{waiver_id}] TTL is {ttl_days:.2} days and exceeds max_ttl_days={max_ttl_days}")]
    WaiverTtlExceeded { target: String, waiver_id: String, ttl_days: f64, max_ttl_days: u64 },
}
