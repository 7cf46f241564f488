//! Suppresses rule/diff messages matched by an approved [`PolicyWaiver`],
//! subject to expiry.

use chrono::{DateTime, Utc};
use regex::Regex;

use abi_guard_types::{AppliedWaiver, PolicyWaiver, Report};

use crate::error::PolicyError;

struct CompiledWaiver<'a> {
    waiver: &'a PolicyWaiver,
    targets: Vec<Regex>,
    pattern: Regex,
}

fn compile(waiver: &PolicyWaiver) -> Result<CompiledWaiver<'_>, PolicyError> {
    let pattern = Regex::new(&waiver.pattern).map_err(|source| PolicyError::InvalidWaiverPattern {
        waiver_id: waiver.waiver_id.clone(),
        pattern: waiver.pattern.clone(),
        source,
    })?;
    let targets = if waiver.targets.is_empty() {
        vec![Regex::new(".*").expect("universal regex always compiles")]
    } else {
        waiver
            .targets
            .iter()
            .map(|target| {
                Regex::new(target).map_err(|source| PolicyError::InvalidWaiverTarget {
                    waiver_id: waiver.waiver_id.clone(),
                    pattern: target.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?
    };
    Ok(CompiledWaiver {
        waiver,
        targets,
        pattern,
    })
}

impl CompiledWaiver<'_> {
    fn matches_target(&self, target_name: &str) -> bool {
        self.targets.iter().any(|pattern| pattern.is_match(target_name))
    }

    fn matches_severity(&self, severity: &str) -> bool {
        self.waiver.severity == "any" || self.waiver.severity == severity
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match &self.waiver.expires_utc {
            Some(expires) => expires
                .parse::<DateTime<Utc>>()
                .map(|expiry| expiry < now)
                .unwrap_or(false),
            None => false,
        }
    }
}

fn apply_bucket(
    values: Vec<String>,
    severity: &str,
    target_name: &str,
    waivers: &[CompiledWaiver<'_>],
    now: DateTime<Utc>,
    waived: &mut Vec<AppliedWaiver>,
    waiver_warnings: &mut Vec<String>,
) -> Vec<String> {
    let mut kept = Vec::with_capacity(values.len());
    for message in values {
        let mut matched = false;
        for compiled in waivers {
            if !compiled.matches_severity(severity) {
                continue;
            }
            if !compiled.matches_target(target_name) {
                continue;
            }
            if !compiled.pattern.is_match(&message) {
                continue;
            }
            if compiled.is_expired(now) {
                waiver_warnings.push(format!(
                    "waiver '{}' expired at {} for target '{target_name}'",
                    compiled.waiver.waiver_id,
                    compiled.waiver.expires_utc.as_deref().unwrap_or("")
                ));
                continue;
            }
            waived.push(AppliedWaiver {
                waiver_id: compiled.waiver.waiver_id.clone(),
                severity: severity.to_string(),
                message: message.clone(),
                created_utc: compiled.waiver.created_utc.clone(),
                owner: compiled.waiver.owner.clone(),
                approved_by: compiled.waiver.approved_by.clone(),
                ticket: compiled.waiver.ticket.clone(),
                reason: compiled.waiver.reason.clone(),
                expires_utc: compiled.waiver.expires_utc.clone(),
            });
            matched = true;
            break;
        }
        if !matched {
            kept.push(message);
        }
    }
    kept
}

/// Suppress report errors/warnings matched by an active waiver, recording
/// each suppression in `waivers_applied` and appending expiry notices to
/// warnings.
pub fn apply_policy_waivers(
    report: &mut Report,
    waivers: &[PolicyWaiver],
    target_name: &str,
    now: DateTime<Utc>,
) -> Result<(), PolicyError> {
    let compiled = waivers.iter().map(compile).collect::<Result<Vec<_>, _>>()?;

    let mut waiver_warnings = Vec::new();
    let errors = std::mem::take(&mut report.errors);
    let warnings = std::mem::take(&mut report.warnings);

    report.errors = apply_bucket(
        errors,
        "error",
        target_name,
        &compiled,
        now,
        &mut report.waivers_applied,
        &mut waiver_warnings,
    );
    report.warnings = apply_bucket(
        warnings,
        "warning",
        target_name,
        &compiled,
        now,
        &mut report.waivers_applied,
        &mut waiver_warnings,
    );
    report.warnings.extend(waiver_warnings);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use abi_guard_types::{AbiVersion, Classification, EnumDiff, LayoutDiff, ReportStatus, StructDiff, VersionBump};

    fn report_with_error(message: &str) -> Report {
        Report {
            status: ReportStatus::Fail,
            change_classification: Classification::Breaking,
            required_bump: VersionBump::Major,
            baseline_abi_version: AbiVersion::new(1, 0, 0),
            current_abi_version: AbiVersion::new(1, 0, 0),
            recommended_next_version: AbiVersion::new(2, 0, 0),
            version_policy_satisfied: true,
            removed_symbols: Vec::new(),
            added_symbols: Vec::new(),
            changed_signatures: Vec::new(),
            enum_diff: EnumDiff::default(),
            struct_diff: StructDiff::default(),
            layout_diff: LayoutDiff::default(),
            breaking_reasons: Vec::new(),
            additive_reasons: Vec::new(),
            errors: vec![message.to_string()],
            warnings: Vec::new(),
            policy_rules_applied: Vec::new(),
            waivers_applied: Vec::new(),
        }
    }

    fn waiver(id: &str, pattern: &str, expires_utc: Option<&str>) -> PolicyWaiver {
        PolicyWaiver {
            waiver_id: id.to_string(),
            targets: Vec::new(),
            severity: "any".to_string(),
            pattern: pattern.to_string(),
            expires_utc: expires_utc.map(str::to_string),
            created_utc: Some("2026-01-01T00:00:00Z".to_string()),
            owner: Some("alice".to_string()),
            reason: Some("known issue".to_string()),
            approved_by: Some("bob".to_string()),
            ticket: Some("ABI-42".to_string()),
        }
    }

    #[test]
    fn matching_waiver_suppresses_error() {
        let mut report = report_with_error("removed symbol widget_free");
        let waivers = vec![waiver("w1", "widget_free", None)];
        apply_policy_waivers(&mut report, &waivers, "libwidget", Utc::now()).unwrap();
        assert!(report.errors.is_empty());
        assert_eq!(report.waivers_applied.len(), 1);
        assert_eq!(report.waivers_applied[0].waiver_id, "w1");
    }

    #[test]
    fn expired_waiver_keeps_error_and_warns() {
        let mut report = report_with_error("removed symbol widget_free");
        let waivers = vec![waiver("w1", "widget_free", Some("2020-01-01T00:00:00Z"))];
        apply_policy_waivers(&mut report, &waivers, "libwidget", Utc::now()).unwrap();
        assert_eq!(report.errors.len(), 1);
        assert!(report.warnings.iter().any(|w| w.contains("expired")));
        assert!(report.waivers_applied.is_empty());
    }

    #[test]
    fn non_matching_target_does_not_suppress() {
        let mut report = report_with_error("removed symbol widget_free");
        let mut w = waiver("w1", "widget_free", None);
        w.targets = vec!["libother".to_string()];
        apply_policy_waivers(&mut report, &[w], "libwidget", Utc::now()).unwrap();
        assert_eq!(report.errors.len(), 1);
    }
}
