//! Applies a resolved [`EffectivePolicy`] to a [`Report`]: checks the
//! classification ceiling and layout-probe requirement, fires rules, then
//! lets waivers suppress whatever fired.

use chrono::{DateTime, Utc};

use abi_guard_types::{Classification, EffectivePolicy, Report, ReportStatus};

use crate::error::PolicyError;
use crate::rules::apply_policy_rules;
use crate::waivers::apply_policy_waivers;

fn classification_rank(classification: Classification) -> u8 {
    match classification {
        Classification::None => 0,
        Classification::Additive => 1,
        Classification::Breaking => 2,
    }
}

fn classification_from_str(value: &str) -> Classification {
    match value {
        "additive" => Classification::Additive,
        "breaking" => Classification::Breaking,
        _ => Classification::None,
    }
}

fn classification_str(classification: Classification) -> &'static str {
    match classification {
        Classification::None => "none",
        Classification::Additive => "additive",
        Classification::Breaking => "breaking",
    }
}

/// Apply `policy` to `report` in place and recompute its pass/fail status.
pub fn apply_policy_to_report(
    report: &mut Report,
    policy: &EffectivePolicy,
    target_name: &str,
) -> Result<(), PolicyError> {
    let max_allowed = classification_from_str(&policy.max_allowed_classification);
    if classification_rank(report.change_classification) > classification_rank(max_allowed) {
        report.errors.push(format!(
            "Policy violation for target '{target_name}': classification '{}' exceeds allowed '{}'.",
            classification_str(report.change_classification),
            policy.max_allowed_classification
        ));
    }

    if policy.require_layout_probe && !report.layout_diff.available_in_current {
        report.errors.push(format!(
            "Policy violation for target '{target_name}': layout probe is required but unavailable."
        ));
    }

    apply_policy_rules(report, &policy.rules, target_name)?;

    let now: DateTime<Utc> = Utc::now();
    apply_policy_waivers(report, &policy.waivers, target_name, now)?;

    let fails_on_warnings = policy.fail_on_warnings && !report.warnings.is_empty();
    report.status = if report.errors.is_empty() && !fails_on_warnings {
        ReportStatus::Pass
    } else {
        ReportStatus::Fail
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use abi_guard_types::{AbiVersion, EnumDiff, LayoutDiff, StructDiff, VersionBump};

    fn report(classification: Classification) -> Report {
        Report {
            status: ReportStatus::Pass,
            change_classification: classification,
            required_bump: VersionBump::None,
            baseline_abi_version: AbiVersion::new(1, 0, 0),
            current_abi_version: AbiVersion::new(1, 0, 0),
            recommended_next_version: AbiVersion::new(1, 0, 0),
            version_policy_satisfied: true,
            removed_symbols: Vec::new(),
            added_symbols: Vec::new(),
            changed_signatures: Vec::new(),
            enum_diff: EnumDiff::default(),
            struct_diff: StructDiff::default(),
            layout_diff: LayoutDiff::default(),
            breaking_reasons: Vec::new(),
            additive_reasons: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            policy_rules_applied: Vec::new(),
            waivers_applied: Vec::new(),
        }
    }

    #[test]
    fn breaking_change_over_ceiling_fails() {
        let mut r = report(Classification::Breaking);
        let mut policy = EffectivePolicy::default();
        policy.max_allowed_classification = "additive".to_string();
        apply_policy_to_report(&mut r, &policy, "libwidget").unwrap();
        assert_eq!(r.status, ReportStatus::Fail);
        assert_eq!(r.errors.len(), 1);
    }

    #[test]
    fn additive_change_within_ceiling_passes() {
        let mut r = report(Classification::Additive);
        let policy = EffectivePolicy::default();
        apply_policy_to_report(&mut r, &policy, "libwidget").unwrap();
        assert_eq!(r.status, ReportStatus::Pass);
    }

    #[test]
    fn fail_on_warnings_promotes_warning_to_failure() {
        let mut r = report(Classification::None);
        r.warnings.push("decorated export widget__imp_free".to_string());
        let mut policy = EffectivePolicy::default();
        policy.fail_on_warnings = true;
        apply_policy_to_report(&mut r, &policy, "libwidget").unwrap();
        assert_eq!(r.status, ReportStatus::Fail);
        assert!(r.errors.is_empty());
    }

    #[test]
    fn missing_required_layout_probe_fails() {
        let mut r = report(Classification::None);
        let mut policy = EffectivePolicy::default();
        policy.require_layout_probe = true;
        apply_policy_to_report(&mut r, &policy, "libwidget").unwrap();
        assert_eq!(r.status, ReportStatus::Fail);
        assert!(r.errors[0].contains("layout probe"));
    }
}
