//! Top-level snapshot differ (C3) and SemVer policy gate (C4): compares a
//! baseline and current [`Snapshot`] and produces a [`Report`].

use std::collections::BTreeSet;

use abi_guard_types::{AbiVersion, Classification, Report, ReportStatus, Snapshot, VersionBump};

use crate::enums::compare_enum_sets;
use crate::layout::compare_layout_probes;
use crate::structs::compare_struct_sets;

#[must_use]
pub fn classify_change(has_breaking: bool, has_additive: bool) -> Classification {
    Classification::classify(has_breaking, has_additive)
}

#[must_use]
pub fn recommended_version(baseline: AbiVersion, required_bump: VersionBump) -> AbiVersion {
    match required_bump {
        VersionBump::Major => baseline.bump_major(),
        VersionBump::Minor => baseline.bump_minor(),
        _ => baseline.bump_patch(),
    }
}

/// `(version_policy_satisfied, errors)`.
#[must_use]
pub fn validate_version_policy(
    baseline_version: AbiVersion,
    current_version: AbiVersion,
    required_bump: VersionBump,
) -> (bool, Vec<String>) {
    let mut errors = Vec::new();

    if current_version.as_tuple() < baseline_version.as_tuple() {
        errors.push(format!(
            "ABI version regressed: baseline {baseline_version} -> current {current_version}."
        ));
        return (false, errors);
    }

    match required_bump {
        VersionBump::Major => {
            if current_version.major <= baseline_version.major {
                errors.push(format!(
                    "Breaking ABI changes detected but ABI major version was not increased (baseline {}, current {}).",
                    baseline_version.major, current_version.major
                ));
                return (false, errors);
            }
        }
        VersionBump::Minor => {
            if current_version.major == baseline_version.major && current_version.minor <= baseline_version.minor {
                errors.push(format!(
                    "Additive ABI changes detected but ABI minor version was not increased (baseline {}.{}, current {}.{}).",
                    baseline_version.major, baseline_version.minor, current_version.major, current_version.minor
                ));
                return (false, errors);
            }
        }
        _ => {}
    }

    (true, errors)
}

const MAX_NON_PREFIXED_PREVIEW: usize = 25;

#[must_use]
pub fn compare_snapshots(baseline: &Snapshot, current: &Snapshot) -> Report {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let base_names: BTreeSet<&String> = baseline.header.functions.keys().collect();
    let curr_names: BTreeSet<&String> = current.header.functions.keys().collect();

    let removed: Vec<String> = base_names.difference(&curr_names).map(|s| s.to_string()).collect();
    let added: Vec<String> = curr_names.difference(&base_names).map(|s| s.to_string()).collect();
    let mut changed: Vec<String> = base_names
        .intersection(&curr_names)
        .filter(|name| baseline.header.functions[**name].signature != current.header.functions[**name].signature)
        .map(|s| s.to_string())
        .collect();
    changed.sort();

    if !removed.is_empty() {
        warnings.push(format!("Header symbols removed since baseline: {}", removed.join(", ")));
    }
    if !changed.is_empty() {
        warnings.push(format!("Header signatures changed since baseline: {}", changed.join(", ")));
    }

    let curr_header_symbols: BTreeSet<&String> = current.header.symbols.iter().collect();

    if current.bindings.available && !current.bindings.symbols.is_empty() {
        let binding_symbols: BTreeSet<&String> = current.bindings.symbols.iter().collect();
        let missing_in_bindings: Vec<String> =
            curr_header_symbols.difference(&binding_symbols).map(|s| s.to_string()).collect();
        let extra_in_bindings: Vec<String> =
            binding_symbols.difference(&curr_header_symbols).map(|s| s.to_string()).collect();
        if !missing_in_bindings.is_empty() {
            errors.push(format!(
                "Header symbols missing in configured bindings: {}",
                missing_in_bindings.join(", ")
            ));
        }
        if !extra_in_bindings.is_empty() {
            errors.push(format!(
                "Configured bindings symbols not present in header: {}",
                extra_in_bindings.join(", ")
            ));
        }
    } else {
        warnings.push("Bindings symbol checks skipped: bindings.symbols is not configured.".to_string());
    }

    if current.binary.available {
        let curr_binary_symbols: BTreeSet<&String> = current.binary.symbols.iter().collect();
        let missing_in_binary: Vec<String> =
            curr_header_symbols.difference(&curr_binary_symbols).map(|s| s.to_string()).collect();
        let extra_prefixed_binary: Vec<String> =
            curr_binary_symbols.difference(&curr_header_symbols).map(|s| s.to_string()).collect();
        if !missing_in_binary.is_empty() {
            errors.push(format!(
                "Header symbols missing in native binary exports: {}",
                missing_in_binary.join(", ")
            ));
        }
        if !extra_prefixed_binary.is_empty() {
            errors.push(format!(
                "Native binary exports prefixed ABI symbols not present in header: {}",
                extra_prefixed_binary.join(", ")
            ));
        }

        if !current.binary.non_prefixed_exports.is_empty() && !current.binary.allow_non_prefixed_exports {
            let preview_count = current.binary.non_prefixed_exports.len().min(MAX_NON_PREFIXED_PREVIEW);
            let mut preview = current.binary.non_prefixed_exports[..preview_count].join(", ");
            if current.binary.non_prefixed_exports.len() > MAX_NON_PREFIXED_PREVIEW {
                preview.push_str(", ...");
            }
            errors.push(format!(
                "Native binary exports non-ABI symbols. Count={}. Examples: {preview}",
                current.binary.non_prefixed_exports.len()
            ));
        }
        if current.binary.potential_calling_convention_mismatch {
            warnings.push(
                "Binary exports contain decorated symbols suggestive of calling-convention drift (e.g., _symbol@N). Review ABI calling conventions."
                    .to_string(),
            );
        }
        if !current.binary.export_tool_errors.is_empty() {
            warnings.push(format!(
                "Some export tools failed while scanning binary ({} failures). Results were produced from available tools.",
                current.binary.export_tool_errors.len()
            ));
        }
    } else if !current.binary.skipped {
        warnings.push("Binary export checks were not executed because the binary path does not exist yet.".to_string());
    }

    let enum_diff = compare_enum_sets(&baseline.header.enums, &current.header.enums);
    let struct_diff = compare_struct_sets(
        &baseline.header.structs,
        &current.header.structs,
        current.policy.type_policy.struct_tail_addition_is_breaking,
    );
    let layout_diff = compare_layout_probes(&baseline.header.layout_probe, &current.header.layout_probe);

    let function_breaking = !removed.is_empty() || !changed.is_empty();
    let function_additive = !added.is_empty();

    let mut breaking_reasons = Vec::new();
    let mut additive_reasons = Vec::new();

    if function_breaking {
        if !removed.is_empty() {
            breaking_reasons.push("removed function symbols".to_string());
        }
        if !changed.is_empty() {
            breaking_reasons.push("changed function signatures".to_string());
        }
    }
    if function_additive {
        additive_reasons.push("added function symbols".to_string());
    }

    breaking_reasons.extend(enum_diff.breaking_changes.iter().cloned());
    additive_reasons.extend(enum_diff.additive_changes.iter().cloned());
    breaking_reasons.extend(struct_diff.breaking_changes.iter().cloned());
    additive_reasons.extend(struct_diff.additive_changes.iter().cloned());
    breaking_reasons.extend(layout_diff.breaking_changes.iter().cloned());
    warnings.extend(layout_diff.warnings.iter().cloned());

    let change_classification = classify_change(!breaking_reasons.is_empty(), !additive_reasons.is_empty());
    let required_bump = change_classification.required_bump();

    let (version_policy_satisfied, version_errors) =
        validate_version_policy(baseline.abi_version, current.abi_version, required_bump);
    errors.extend(version_errors);

    let recommended_next_version = recommended_version(baseline.abi_version, required_bump);

    let mut report = Report {
        status: ReportStatus::Pass,
        change_classification,
        required_bump,
        baseline_abi_version: baseline.abi_version,
        current_abi_version: current.abi_version,
        recommended_next_version,
        version_policy_satisfied,
        removed_symbols: removed,
        added_symbols: added,
        changed_signatures: changed,
        enum_diff,
        struct_diff,
        layout_diff,
        breaking_reasons,
        additive_reasons,
        errors,
        warnings,
        policy_rules_applied: Vec::new(),
        waivers_applied: Vec::new(),
    };
    report.status = report.recompute_status();
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use abi_guard_types::{
        BindingsPayload, BinaryPayload, HeaderFunction, HeaderPayload, LayoutProbePayload, SnapshotPolicy,
        ToolIdentity, TypePolicy,
    };
    use std::collections::BTreeMap;

    fn snapshot_with_functions(functions: BTreeMap<String, HeaderFunction>, version: AbiVersion) -> Snapshot {
        let symbols: Vec<String> = functions.keys().cloned().collect();
        Snapshot {
            tool: ToolIdentity::default(),
            target: "widget".to_string(),
            generated_at_utc: "2026-01-01T00:00:00Z".to_string(),
            policy: SnapshotPolicy {
                type_policy: TypePolicy::default(),
                strict_semver: true,
            },
            abi_version: version,
            header: HeaderPayload {
                path: "widget.h".to_string(),
                function_count: functions.len(),
                symbols,
                functions,
                enum_count: 0,
                enums: BTreeMap::new(),
                struct_count: 0,
                structs: BTreeMap::new(),
                opaque_types: Vec::new(),
                opaque_type_declarations: Vec::new(),
                callback_typedefs: Vec::new(),
                constants: BTreeMap::new(),
                parser: abi_guard_types::ParserInfo {
                    backend_requested: "regex".to_string(),
                    backend: "regex".to_string(),
                    fallback_used: false,
                    parse_mode: "api_call_macro_match".to_string(),
                    details: BTreeMap::new(),
                },
                layout_probe: LayoutProbePayload {
                    enabled: false,
                    available: false,
                    reason: Some("disabled".to_string()),
                    compiler: None,
                    errors: Vec::new(),
                    structs: BTreeMap::new(),
                },
            },
            bindings: BindingsPayload::not_configured(),
            binary: BinaryPayload::not_configured(),
        }
    }

    fn func(sig: &str) -> HeaderFunction {
        HeaderFunction {
            return_type: "int".to_string(),
            parameters: "void".to_string(),
            signature: sig.to_string(),
        }
    }

    #[test]
    fn identical_snapshots_pass_with_no_bump_required() {
        let mut functions = BTreeMap::new();
        functions.insert("widget_init".to_string(), func("int (void)"));
        let base = snapshot_with_functions(functions.clone(), AbiVersion::new(1, 0, 0));
        let curr = snapshot_with_functions(functions, AbiVersion::new(1, 0, 0));

        let report = compare_snapshots(&base, &curr);
        assert_eq!(report.status, ReportStatus::Pass);
        assert_eq!(report.change_classification, Classification::None);
    }

    #[test]
    fn removed_function_requires_major_bump() {
        let mut base_functions = BTreeMap::new();
        base_functions.insert("widget_init".to_string(), func("int (void)"));
        base_functions.insert("widget_shutdown".to_string(), func("void (void)"));
        let curr_functions = {
            let mut m = BTreeMap::new();
            m.insert("widget_init".to_string(), func("int (void)"));
            m
        };

        let base = snapshot_with_functions(base_functions, AbiVersion::new(1, 0, 0));
        let curr = snapshot_with_functions(curr_functions, AbiVersion::new(1, 0, 0));

        let report = compare_snapshots(&base, &curr);
        assert_eq!(report.change_classification, Classification::Breaking);
        assert_eq!(report.required_bump, VersionBump::Major);
        assert!(!report.version_policy_satisfied);
        assert_eq!(report.status, ReportStatus::Fail);
    }

    #[test]
    fn added_function_with_correct_minor_bump_passes() {
        let base_functions = {
            let mut m = BTreeMap::new();
            m.insert("widget_init".to_string(), func("int (void)"));
            m
        };
        let curr_functions = {
            let mut m = BTreeMap::new();
            m.insert("widget_init".to_string(), func("int (void)"));
            m.insert("widget_extra".to_string(), func("int (void)"));
            m
        };

        let base = snapshot_with_functions(base_functions, AbiVersion::new(1, 0, 0));
        let curr = snapshot_with_functions(curr_functions, AbiVersion::new(1, 1, 0));

        let report = compare_snapshots(&base, &curr);
        assert_eq!(report.change_classification, Classification::Additive);
        assert!(report.version_policy_satisfied);
        assert_eq!(report.status, ReportStatus::Pass);
    }

    #[test]
    fn version_regression_always_fails() {
        let mut functions = BTreeMap::new();
        functions.insert("widget_init".to_string(), func("int (void)"));
        let base = snapshot_with_functions(functions.clone(), AbiVersion::new(2, 0, 0));
        let curr = snapshot_with_functions(functions, AbiVersion::new(1, 9, 0));

        let report = compare_snapshots(&base, &curr);
        assert!(!report.version_policy_satisfied);
        assert_eq!(report.status, ReportStatus::Fail);
    }

    #[test]
    fn recommended_version_applies_correct_bump() {
        let base = AbiVersion::new(1, 2, 3);
        assert_eq!(recommended_version(base, VersionBump::Major), AbiVersion::new(2, 0, 0));
        assert_eq!(recommended_version(base, VersionBump::Minor), AbiVersion::new(1, 3, 0));
        assert_eq!(recommended_version(base, VersionBump::Patch), AbiVersion::new(1, 2, 4));
    }
}
