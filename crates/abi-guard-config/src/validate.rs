//! Semantic validation that `serde`'s structural typing can't express:
//! non-empty required strings, compilable regex patterns, a supported IDL
//! schema version, and policy enum membership.

use regex::Regex;

use crate::error::ConfigError;
use crate::model::{ConfigRaw, HeaderRaw, PolicyRaw, TargetRaw};

const IDL_SCHEMA_VERSION: u32 = abi_guard_types::IDL_SCHEMA_VERSION;

fn require_non_empty(target: &str, field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::EmptyString {
            target: target.to_string(),
            field: field.to_string(),
        });
    }
    Ok(())
}

fn validate_header(target: &str, header: &HeaderRaw) -> Result<(), ConfigError> {
    require_non_empty(target, "header.path", &header.path)?;
    require_non_empty(target, "header.api_macro", &header.api_macro)?;
    require_non_empty(target, "header.call_macro", &header.call_macro)?;
    require_non_empty(target, "header.symbol_prefix", &header.symbol_prefix)?;
    require_non_empty(target, "header.version_macros.major", &header.version_macros.major)?;
    require_non_empty(target, "header.version_macros.minor", &header.version_macros.minor)?;
    require_non_empty(target, "header.version_macros.patch", &header.version_macros.patch)?;

    if let Some(types) = &header.types {
        if let Some(pattern) = &types.enum_name_pattern {
            Regex::new(pattern).map_err(|source| ConfigError::InvalidRegex {
                target: target.to_string(),
                field: "header.types.enum_name_pattern".to_string(),
                source,
            })?;
        }
        if let Some(pattern) = &types.struct_name_pattern {
            Regex::new(pattern).map_err(|source| ConfigError::InvalidRegex {
                target: target.to_string(),
                field: "header.types.struct_name_pattern".to_string(),
                source,
            })?;
        }
    }

    Ok(())
}

fn validate_policy(target: &str, policy: &PolicyRaw) -> Result<(), ConfigError> {
    if let Some(classification) = &policy.max_allowed_classification {
        if !matches!(classification.as_str(), "none" | "additive" | "breaking") {
            return Err(ConfigError::InvalidClassification {
                target: target.to_string(),
            });
        }
    }
    for waiver in &policy.waivers {
        require_non_empty(target, "policy.waivers[].waiver_id", &waiver.waiver_id)?;
        require_non_empty(target, "policy.waivers[].pattern", &waiver.pattern)?;
        Regex::new(&waiver.pattern).map_err(|source| ConfigError::InvalidRegex {
            target: target.to_string(),
            field: "policy.waivers[].pattern".to_string(),
            source,
        })?;
    }
    for rule in &policy.rules {
        require_non_empty(target, "policy.rules[].rule_id", &rule.rule_id)?;
    }
    Ok(())
}

fn validate_codegen(target: &str, raw: &TargetRaw) -> Result<(), ConfigError> {
    let Some(codegen) = &raw.codegen else { return Ok(()) };

    if let Some(found) = codegen.idl_schema_version {
        if found != IDL_SCHEMA_VERSION {
            return Err(ConfigError::UnsupportedIdlSchemaVersion {
                target: target.to_string(),
                found,
                expected: IDL_SCHEMA_VERSION,
            });
        }
    }

    for (field, patterns) in [
        ("codegen.include_symbols_regex", &codegen.include_symbols_regex),
        ("codegen.exclude_symbols_regex", &codegen.exclude_symbols_regex),
    ] {
        for pattern in patterns {
            Regex::new(pattern).map_err(|source| ConfigError::InvalidRegex {
                target: target.to_string(),
                field: field.to_string(),
                source,
            })?;
        }
    }

    Ok(())
}

fn validate_target(name: &str, raw: &TargetRaw) -> Result<(), ConfigError> {
    validate_header(name, &raw.header)?;
    if let Some(policy) = &raw.policy {
        validate_policy(name, policy)?;
    }
    validate_codegen(name, raw)?;
    Ok(())
}

/// Validates a fully-deserialized config payload. serde already rejected
/// anything structurally malformed (wrong types, missing required fields);
/// this only checks the handful of rules that need runtime values.
pub fn validate_config(config: &ConfigRaw) -> Result<(), ConfigError> {
    if config.targets.is_empty() {
        return Err(ConfigError::NoTargets);
    }
    if let Some(policy) = &config.policy {
        validate_policy("<root>", policy)?;
    }
    for (name, target) in &config.targets {
        validate_target(name, target)?;
    }
    Ok(())
}
