//! Converts validated raw config sections into the strongly-typed
//! configuration objects the rest of the workspace consumes: a header
//! parser config, a type policy, an effective (root-merged-with-target)
//! policy, a codegen symbol filter, and a native-header render config.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use abi_guard_codegen::{NativeHeaderConfig, RawGeneratorEntry};
use abi_guard_idl::{CodegenSymbolFilter, IdlBuildConfig};
use abi_guard_parser::header::{HeaderParseConfig, ParserBackend};
use abi_guard_parser::preprocess::PreprocessConfig;
use abi_guard_snapshot::layout::LayoutProbeConfig;
use abi_guard_types::{EffectivePolicy, PolicyWaiver, TypePolicy, WaiverRequirements};
use regex::Regex;

use crate::error::ConfigError;
use crate::model::{GeneratorRaw, HeaderRaw, PolicyRaw};

#[must_use]
pub fn build_type_policy(header: &HeaderRaw, symbol_prefix: &str) -> TypePolicy {
    let raw = header.types.clone().unwrap_or_default();
    let default_pattern = format!("^{}", regex::escape(symbol_prefix));

    TypePolicy {
        enable_enums: raw.enable_enums.unwrap_or(true),
        enable_structs: raw.enable_structs.unwrap_or(true),
        enum_name_pattern: raw.enum_name_pattern.unwrap_or_else(|| default_pattern.clone()),
        struct_name_pattern: raw.struct_name_pattern.unwrap_or(default_pattern),
        ignore_enums: raw.ignore_enums,
        ignore_structs: raw.ignore_structs,
        struct_tail_addition_is_breaking: raw.struct_tail_addition_is_breaking.unwrap_or(true),
    }
}

#[must_use]
pub fn resolve_header_parser_config(header: &HeaderRaw) -> HeaderParseConfig {
    let raw = header.parser.clone().unwrap_or_default();
    let backend = match raw.backend.as_deref() {
        Some("clang_preprocess") => ParserBackend::ClangPreprocess,
        _ => ParserBackend::Regex,
    };

    HeaderParseConfig {
        backend,
        fallback_to_regex: raw.fallback_to_regex.unwrap_or(true),
        preprocess: PreprocessConfig {
            compiler: raw.compiler,
            compiler_candidates: raw.compiler_candidates,
            include_dirs: raw.include_dirs,
            extra_args: raw.args,
            ..PreprocessConfig::default()
        },
    }
}

fn merged_waiver_requirements(root: Option<&PolicyRaw>, target: Option<&PolicyRaw>) -> WaiverRequirements {
    let defaults = WaiverRequirements::default();
    let root_req = root.and_then(|p| p.waiver_requirements.as_ref());
    let target_req = target.and_then(|p| p.waiver_requirements.as_ref());

    macro_rules! pick {
        ($field:ident) => {
            target_req
                .and_then(|r| r.$field)
                .or_else(|| root_req.and_then(|r| r.$field))
                .unwrap_or(defaults.$field)
        };
    }

    WaiverRequirements {
        require_owner: pick!(require_owner),
        require_reason: pick!(require_reason),
        require_expires_utc: pick!(require_expires_utc),
        require_approved_by: pick!(require_approved_by),
        require_ticket: pick!(require_ticket),
        max_ttl_days: target_req
            .and_then(|r| r.max_ttl_days)
            .or_else(|| root_req.and_then(|r| r.max_ttl_days))
            .or(defaults.max_ttl_days),
        warn_expiring_within_days: target_req
            .and_then(|r| r.warn_expiring_within_days)
            .or_else(|| root_req.and_then(|r| r.warn_expiring_within_days))
            .unwrap_or(defaults.warn_expiring_within_days),
    }
}

fn parse_waiver_timestamp(target: &str, waiver_id: &str, field: &'static str, value: &str) -> Result<DateTime<Utc>, ConfigError> {
    value.parse::<DateTime<Utc>>().map_err(|_| ConfigError::WaiverInvalidTimestamp {
        target: target.to_string(),
        waiver_id: waiver_id.to_string(),
        field,
        value: value.to_string(),
    })
}

/// Validates a merged waiver list against its merged `waiver_requirements`,
/// mirroring the original implementation's `normalize_policy_waivers`: a
/// waiver missing a required metadata field, with an inverted TTL
/// (`expires_utc` earlier than `created_utc`), or exceeding `max_ttl_days`
/// fails the whole resolution rather than being silently accepted.
fn enforce_waiver_requirements(target: &str, waivers: &[PolicyWaiver], requirements: &WaiverRequirements) -> Result<(), ConfigError> {
    for waiver in waivers {
        if requirements.require_owner && waiver.owner.as_deref().unwrap_or("").is_empty() {
            return Err(ConfigError::WaiverMissingField {
                target: target.to_string(),
                waiver_id: waiver.waiver_id.clone(),
                field: "owner",
            });
        }
        if requirements.require_reason && waiver.reason.as_deref().unwrap_or("").is_empty() {
            return Err(ConfigError::WaiverMissingField {
                target: target.to_string(),
                waiver_id: waiver.waiver_id.clone(),
                field: "reason",
            });
        }
        if requirements.require_expires_utc && waiver.expires_utc.as_deref().unwrap_or("").is_empty() {
            return Err(ConfigError::WaiverMissingField {
                target: target.to_string(),
                waiver_id: waiver.waiver_id.clone(),
                field: "expires_utc",
            });
        }
        if requirements.require_approved_by && waiver.approved_by.as_deref().unwrap_or("").is_empty() {
            return Err(ConfigError::WaiverMissingField {
                target: target.to_string(),
                waiver_id: waiver.waiver_id.clone(),
                field: "approved_by",
            });
        }
        if requirements.require_ticket && waiver.ticket.as_deref().unwrap_or("").is_empty() {
            return Err(ConfigError::WaiverMissingField {
                target: target.to_string(),
                waiver_id: waiver.waiver_id.clone(),
                field: "ticket",
            });
        }

        if let Some(max_ttl_days) = requirements.max_ttl_days {
            let created_utc = waiver.created_utc.as_deref().filter(|s| !s.is_empty());
            let expires_utc = waiver.expires_utc.as_deref().filter(|s| !s.is_empty());
            let (Some(created_utc), Some(expires_utc)) = (created_utc, expires_utc) else {
                return Err(ConfigError::WaiverMissingTtlFields {
                    target: target.to_string(),
                    waiver_id: waiver.waiver_id.clone(),
                });
            };
            let created_at = parse_waiver_timestamp(target, &waiver.waiver_id, "created_utc", created_utc)?;
            let expires_at = parse_waiver_timestamp(target, &waiver.waiver_id, "expires_utc", expires_utc)?;

            let ttl_days = (expires_at - created_at).num_seconds() as f64 / 86_400.0;
            if ttl_days < 0.0 {
                return Err(ConfigError::WaiverTtlInverted {
                    target: target.to_string(),
                    waiver_id: waiver.waiver_id.clone(),
                });
            }
            if ttl_days > max_ttl_days as f64 {
                return Err(ConfigError::WaiverTtlExceeded {
                    target: target.to_string(),
                    waiver_id: waiver.waiver_id.clone(),
                    ttl_days,
                    max_ttl_days,
                });
            }
        }
    }
    Ok(())
}

/// Merges root `[policy]` with a target's `[targets.NAME.policy]` override,
/// field by field, target winning when both specify a value. Rule and
/// waiver lists are concatenated root-then-target rather than replaced.
/// Fails fatally on the first waiver that violates the merged
/// `waiver_requirements` (missing required metadata, inverted or
/// over-budget TTL), matching the original implementation's fatal
/// `AbiFrameworkError` on non-compliant waivers.
pub fn resolve_effective_policy(target_name: &str, root: Option<&PolicyRaw>, target: Option<&PolicyRaw>) -> Result<EffectivePolicy, ConfigError> {
    let defaults = EffectivePolicy::default();

    let max_allowed_classification = target
        .and_then(|p| p.max_allowed_classification.clone())
        .or_else(|| root.and_then(|p| p.max_allowed_classification.clone()))
        .unwrap_or(defaults.max_allowed_classification);

    let fail_on_warnings = target
        .and_then(|p| p.fail_on_warnings)
        .or_else(|| root.and_then(|p| p.fail_on_warnings))
        .unwrap_or(defaults.fail_on_warnings);

    let require_layout_probe = target
        .and_then(|p| p.require_layout_probe)
        .or_else(|| root.and_then(|p| p.require_layout_probe))
        .unwrap_or(defaults.require_layout_probe);

    let mut rules = root.map(|p| p.rules.clone()).unwrap_or_default();
    rules.extend(target.map(|p| p.rules.clone()).unwrap_or_default());

    let mut waivers = root.map(|p| p.waivers.clone()).unwrap_or_default();
    waivers.extend(target.map(|p| p.waivers.clone()).unwrap_or_default());

    let waiver_requirements = merged_waiver_requirements(root, target);
    enforce_waiver_requirements(target_name, &waivers, &waiver_requirements)?;

    Ok(EffectivePolicy {
        max_allowed_classification,
        fail_on_warnings,
        require_layout_probe,
        rules,
        waivers,
        waiver_requirements,
    })
}

fn compiled_patterns(target: &str, field: &str, patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|source| ConfigError::InvalidRegex {
                target: target.to_string(),
                field: field.to_string(),
                source,
            })
        })
        .collect()
}

#[must_use]
pub fn resolve_generator_entries(generators: &[GeneratorRaw]) -> Vec<RawGeneratorEntry> {
    generators
        .iter()
        .map(|g| RawGeneratorEntry {
            name: g.name.clone(),
            kind: g.kind.clone(),
            enabled: g.enabled,
            command: g.command.clone(),
        })
        .collect()
}

#[must_use]
pub fn generator_entry_names(generators: &[RawGeneratorEntry]) -> Vec<String> {
    generators.iter().filter(|g| g.enabled).filter_map(|g| g.name.clone()).collect()
}

/// Builds the [`IdlBuildConfig`] (symbol filter, docs, deprecated set, enabled
/// flag) a target's `codegen`/`bindings` sections describe.
pub fn resolve_idl_build_config(
    target_name: &str,
    codegen: Option<&crate::model::CodegenRaw>,
    bindings: Option<&crate::model::BindingsRaw>,
) -> Result<IdlBuildConfig, ConfigError> {
    let codegen = codegen.cloned().unwrap_or_default();
    let bindings = bindings.cloned().unwrap_or_default();

    let include_patterns = compiled_patterns(target_name, "codegen.include_symbols_regex", &codegen.include_symbols_regex)?;
    let exclude_patterns = compiled_patterns(target_name, "codegen.exclude_symbols_regex", &codegen.exclude_symbols_regex)?;

    let filter = CodegenSymbolFilter {
        include_symbols: codegen.include_symbols.into_iter().collect::<BTreeSet<_>>(),
        exclude_symbols: codegen.exclude_symbols.into_iter().collect::<BTreeSet<_>>(),
        include_patterns,
        exclude_patterns,
    };

    Ok(IdlBuildConfig {
        enabled: codegen.enabled.unwrap_or(true),
        filter,
        symbol_docs: bindings.symbol_docs,
        deprecated_symbols: bindings.deprecated_symbols.into_iter().collect::<BTreeSet<_>>(),
    })
}

#[must_use]
pub fn resolve_native_header_config(codegen: Option<&crate::model::CodegenRaw>) -> NativeHeaderConfig {
    let codegen = codegen.cloned().unwrap_or_default();
    let mut cfg = NativeHeaderConfig::default();
    if let Some(api_macro) = codegen.native_api_macro {
        cfg.api_macro = api_macro;
    }
    if let Some(call_macro) = codegen.native_call_macro {
        cfg.call_macro = call_macro;
    }
    cfg.header_guard = codegen.native_header_guard;
    cfg.native_constants = codegen.native_constants;
    cfg
}

#[must_use]
pub fn bindings_expected_symbols(bindings: Option<&crate::model::BindingsRaw>) -> Vec<String> {
    bindings.map(|b| b.expected_symbols.clone()).unwrap_or_default()
}

#[must_use]
pub fn resolve_layout_probe_config(header: &HeaderRaw) -> LayoutProbeConfig {
    let Some(raw) = &header.layout else { return LayoutProbeConfig::default() };
    LayoutProbeConfig {
        enable: raw.enable.unwrap_or(false),
        compiler: raw.compiler.clone(),
        cflags: raw.cflags.clone(),
        include_dirs: raw.include_dirs.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HeaderRaw, VersionMacrosRaw};

    fn header_raw() -> HeaderRaw {
        HeaderRaw {
            path: "widget.h".to_string(),
            api_macro: "WIDGET_API".to_string(),
            call_macro: "WIDGET_CALL".to_string(),
            symbol_prefix: "widget_".to_string(),
            version_macros: VersionMacrosRaw {
                major: "WIDGET_VERSION_MAJOR".to_string(),
                minor: "WIDGET_VERSION_MINOR".to_string(),
                patch: "WIDGET_VERSION_PATCH".to_string(),
            },
            parser: None,
            types: None,
            layout: None,
        }
    }

    #[test]
    fn type_policy_defaults_to_symbol_prefix_pattern() {
        let policy = build_type_policy(&header_raw(), "widget_");
        assert_eq!(policy.enum_name_pattern, "^widget_");
        assert!(policy.enable_enums);
        assert!(policy.struct_tail_addition_is_breaking);
    }

    #[test]
    fn parser_config_defaults_to_regex_backend() {
        let cfg = resolve_header_parser_config(&header_raw());
        assert!(matches!(cfg.backend, ParserBackend::Regex));
        assert!(cfg.fallback_to_regex);
    }

    #[test]
    fn target_policy_overrides_root_classification() {
        let root = PolicyRaw {
            max_allowed_classification: Some("additive".to_string()),
            ..Default::default()
        };
        let target = PolicyRaw {
            max_allowed_classification: Some("breaking".to_string()),
            ..Default::default()
        };
        let effective = resolve_effective_policy("widget", Some(&root), Some(&target)).unwrap();
        assert_eq!(effective.max_allowed_classification, "breaking");
    }

    #[test]
    fn rules_from_root_and_target_are_concatenated() {
        let root = PolicyRaw::default();
        let target = PolicyRaw::default();
        let effective = resolve_effective_policy("widget", Some(&root), Some(&target)).unwrap();
        assert!(effective.rules.is_empty());
    }

    #[test]
    fn waiver_missing_required_owner_is_rejected() {
        let root = PolicyRaw {
            waivers: vec![PolicyWaiver {
                waiver_id: "w1".to_string(),
                targets: Vec::new(),
                severity: "any".to_string(),
                pattern: ".*".to_string(),
                expires_utc: None,
                created_utc: None,
                owner: None,
                reason: None,
                approved_by: None,
                ticket: None,
            }],
            waiver_requirements: Some(crate::model::WaiverRequirementsRaw { require_owner: Some(true), ..Default::default() }),
            ..Default::default()
        };
        let err = resolve_effective_policy("widget", Some(&root), None).unwrap_err();
        assert!(matches!(err, ConfigError::WaiverMissingField { field: "owner", .. }));
    }

    #[test]
    fn waiver_exceeding_max_ttl_is_rejected() {
        let root = PolicyRaw {
            waivers: vec![PolicyWaiver {
                waiver_id: "w1".to_string(),
                targets: Vec::new(),
                severity: "any".to_string(),
                pattern: ".*".to_string(),
                expires_utc: Some("2030-01-01T00:00:00Z".to_string()),
                created_utc: Some("2020-01-01T00:00:00Z".to_string()),
                owner: None,
                reason: None,
                approved_by: None,
                ticket: None,
            }],
            waiver_requirements: Some(crate::model::WaiverRequirementsRaw { max_ttl_days: Some(30), ..Default::default() }),
            ..Default::default()
        };
        let err = resolve_effective_policy("widget", Some(&root), None).unwrap_err();
        assert!(matches!(err, ConfigError::WaiverTtlExceeded { .. }));
    }

    #[test]
    fn waiver_within_requirements_resolves_cleanly() {
        let root = PolicyRaw {
            waivers: vec![PolicyWaiver {
                waiver_id: "w1".to_string(),
                targets: Vec::new(),
                severity: "any".to_string(),
                pattern: ".*".to_string(),
                expires_utc: Some("2030-01-01T00:00:00Z".to_string()),
                created_utc: Some("2029-01-01T00:00:00Z".to_string()),
                owner: Some("alice".to_string()),
                reason: Some("known gap".to_string()),
                approved_by: Some("bob".to_string()),
                ticket: Some("TICKET-1".to_string()),
            }],
            waiver_requirements: Some(crate::model::WaiverRequirementsRaw {
                require_owner: Some(true),
                require_reason: Some(true),
                require_expires_utc: Some(true),
                require_approved_by: Some(true),
                require_ticket: Some(true),
                max_ttl_days: Some(400),
                warn_expiring_within_days: None,
            }),
            ..Default::default()
        };
        let effective = resolve_effective_policy("widget", Some(&root), None).unwrap();
        assert_eq!(effective.waivers.len(), 1);
    }

    #[test]
    fn layout_probe_defaults_to_disabled_when_absent() {
        let cfg = resolve_layout_probe_config(&header_raw());
        assert!(!cfg.enable);
    }

    #[test]
    fn layout_probe_config_is_read_from_header() {
        let mut header = header_raw();
        header.layout = Some(crate::model::LayoutRaw {
            enable: Some(true),
            compiler: Some("clang".to_string()),
            cflags: vec!["-m64".to_string()],
            include_dirs: vec!["include".to_string()],
        });
        let cfg = resolve_layout_probe_config(&header);
        assert!(cfg.enable);
        assert_eq!(cfg.compiler.as_deref(), Some("clang"));
        assert_eq!(cfg.cflags, vec!["-m64".to_string()]);
    }
}
