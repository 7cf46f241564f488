//! Evaluates [`PolicyRule`] predicates against a [`Report`] and appends
//! their messages to the report's errors/warnings.

use regex::Regex;

use abi_guard_types::{AppliedRule, Classification, PolicyRule, Report, Severity};

use crate::error::PolicyError;

fn classification_str(classification: Classification) -> &'static str {
    match classification {
        Classification::None => "none",
        Classification::Additive => "additive",
        Classification::Breaking => "breaking",
    }
}

fn compile_all(rule_id: &str, patterns: &[String]) -> Result<Vec<Regex>, PolicyError> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|source| PolicyError::InvalidRulePattern {
                rule_id: rule_id.to_string(),
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

/// True if every pattern matches at least one value; vacuously true when
/// `patterns` is empty.
fn match_all(patterns: &[Regex], values: &[String]) -> bool {
    patterns
        .iter()
        .all(|pattern| values.iter().any(|value| pattern.is_match(value)))
}

/// True if any pattern matches any value; vacuously true when `patterns`
/// is empty.
fn match_any(patterns: &[Regex], values: &[String]) -> bool {
    if patterns.is_empty() {
        return true;
    }
    patterns
        .iter()
        .any(|pattern| values.iter().any(|value| pattern.is_match(value)))
}

/// Apply every enabled rule to `report`, appending matched messages to its
/// errors/warnings and recording each firing in `policy_rules_applied`.
pub fn apply_policy_rules(
    report: &mut Report,
    rules: &[PolicyRule],
    target_name: &str,
) -> Result<(), PolicyError> {
    let classification = classification_str(report.change_classification);

    for rule in rules {
        if !rule.enabled {
            continue;
        }
        let when = &rule.when;

        if let Some(allowed) = &when.classification_in {
            if !allowed.iter().any(|item| item == classification) {
                continue;
            }
        }
        if let Some(disallowed) = &when.classification_not_in {
            if disallowed.iter().any(|item| item == classification) {
                continue;
            }
        }

        let count_checks: [(Option<u64>, usize); 7] = [
            (when.removed_symbols_count_gt, report.removed_symbols.len()),
            (when.added_symbols_count_gt, report.added_symbols.len()),
            (
                when.changed_signatures_count_gt,
                report.changed_signatures.len(),
            ),
            (
                when.breaking_reasons_count_gt,
                report.breaking_reasons.len(),
            ),
            (
                when.additive_reasons_count_gt,
                report.additive_reasons.len(),
            ),
            (when.warnings_count_gt, report.warnings.len()),
            (when.errors_count_gt, report.errors.len()),
        ];
        let failed_count_gate = count_checks
            .iter()
            .any(|(threshold, count)| matches!(threshold, Some(t) if *count as u64 <= *t));
        if failed_count_gate {
            continue;
        }

        let regex_checks: [(&Option<Vec<String>>, &[String], bool); 14] = [
            (&when.removed_symbols_regex_all, &report.removed_symbols, true),
            (&when.added_symbols_regex_all, &report.added_symbols, true),
            (
                &when.changed_signatures_regex_all,
                &report.changed_signatures,
                true,
            ),
            (
                &when.breaking_reasons_regex_all,
                &report.breaking_reasons,
                true,
            ),
            (
                &when.additive_reasons_regex_all,
                &report.additive_reasons,
                true,
            ),
            (&when.warnings_regex_all, &report.warnings, true),
            (&when.errors_regex_all, &report.errors, true),
            (&when.removed_symbols_regex_any, &report.removed_symbols, false),
            (&when.added_symbols_regex_any, &report.added_symbols, false),
            (
                &when.changed_signatures_regex_any,
                &report.changed_signatures,
                false,
            ),
            (
                &when.breaking_reasons_regex_any,
                &report.breaking_reasons,
                false,
            ),
            (
                &when.additive_reasons_regex_any,
                &report.additive_reasons,
                false,
            ),
            (&when.warnings_regex_any, &report.warnings, false),
            (&when.errors_regex_any, &report.errors, false),
        ];

        let mut regex_gate_failed = false;
        for (raw_patterns, values, is_all) in regex_checks {
            let Some(raw_patterns) = raw_patterns else {
                continue;
            };
            let compiled = compile_all(&rule.rule_id, raw_patterns)?;
            let matched = if is_all {
                match_all(&compiled, values)
            } else {
                match_any(&compiled, values)
            };
            if !matched {
                regex_gate_failed = true;
                break;
            }
        }
        if regex_gate_failed {
            continue;
        }

        let message = format!(
            "[policy:{}] {} (target={target_name})",
            rule.rule_id, rule.message
        );
        match rule.severity {
            Severity::Warning => report.warnings.push(message.clone()),
            Severity::Error => report.errors.push(message.clone()),
        }
        report.policy_rules_applied.push(AppliedRule {
            id: rule.rule_id.clone(),
            severity: rule.severity.as_str().to_string(),
            message,
        });
    }

    Ok(())
}
