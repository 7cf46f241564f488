//! Aggregate reporting: combines one [`Report`] per target into a JSON
//! summary, a Markdown changelog, and a SARIF document, mirroring the
//! original implementation's `print_report`/`write_markdown_report`/
//! `render_changelog_document`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use abi_guard_types::{Classification, EnumChange, Report, ReportStatus, StructChange};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassificationCounts {
    pub none: u64,
    pub additive: u64,
    pub breaking: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Summary {
    pub target_count: u64,
    pub pass_count: u64,
    pub fail_count: u64,
    pub error_count: u64,
    pub warning_count: u64,
    pub classification: ClassificationCounts,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateReport {
    pub generated_at_utc: String,
    pub results: BTreeMap<String, Report>,
    pub summary: Summary,
}

impl AggregateReport {
    #[must_use]
    pub fn new(generated_at_utc: String, results: BTreeMap<String, Report>) -> Self {
        let mut summary = Summary { target_count: results.len() as u64, ..Summary::default() };
        for report in results.values() {
            match report.status {
                ReportStatus::Pass => summary.pass_count += 1,
                ReportStatus::Fail => summary.fail_count += 1,
            }
            summary.error_count += report.errors.len() as u64;
            summary.warning_count += report.warnings.len() as u64;
            match report.change_classification {
                Classification::None => summary.classification.none += 1,
                Classification::Additive => summary.classification.additive += 1,
                Classification::Breaking => summary.classification.breaking += 1,
            }
        }
        Self { generated_at_utc, results, summary }
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.summary.fail_count > 0
    }
}

fn append_markdown_list(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("### {heading}\n\n"));
    for item in items {
        out.push_str(&format!("- {item}\n"));
    }
    out.push('\n');
}

/// One-paragraph human summary for a single target, mirroring the original
/// `print_report` console output.
#[must_use]
pub fn render_console_summary(target_name: &str, report: &Report) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "[{status}] {target_name}: {removed} removed, {added} added, {changed} changed — classification={classification:?}, bump={bump:?}, baseline={baseline}, current={current}, recommended={recommended}\n",
        status = if report.status == ReportStatus::Pass { "PASS" } else { "FAIL" },
        removed = report.removed_symbols.len(),
        added = report.added_symbols.len(),
        changed = report.changed_signatures.len(),
        classification = report.change_classification,
        bump = report.required_bump,
        baseline = report.baseline_abi_version,
        current = report.current_abi_version,
        recommended = report.recommended_next_version,
    ));
    for warning in &report.warnings {
        out.push_str(&format!("  warning: {warning}\n"));
    }
    for error in &report.errors {
        out.push_str(&format!("  error: {error}\n"));
    }
    out
}

/// Human summary across every target in an [`AggregateReport`]: each
/// target's [`render_console_summary`] line, followed by the pass/fail
/// totals.
#[must_use]
pub fn render_console_summary_all(aggregate: &AggregateReport) -> String {
    let mut out = String::new();
    for (target_name, report) in &aggregate.results {
        out.push_str(&render_console_summary(target_name, report));
    }
    out.push_str(&format!(
        "\n{pass} passed, {fail} failed ({total} target(s))\n",
        pass = aggregate.summary.pass_count,
        fail = aggregate.summary.fail_count,
        total = aggregate.summary.target_count,
    ));
    out
}

/// Renders a single-target Markdown report: baseline/current version,
/// classification, bump, counts, then Breaking/Additive/Warnings/Errors
/// sections.
#[must_use]
pub fn render_markdown_report(target_name: &str, report: &Report) -> String {
    let mut out = String::new();
    let status_label = if report.status == ReportStatus::Pass { "pass" } else { "fail" };
    out.push_str(&format!("# ABI Report ({status_label})\n\n"));
    out.push_str(&format!("- Target: `{target_name}`\n"));
    out.push_str(&format!("- Baseline version: `{}`\n", report.baseline_abi_version));
    out.push_str(&format!("- Current version: `{}`\n", report.current_abi_version));
    out.push_str(&format!("- Recommended next version: `{}`\n", report.recommended_next_version));
    out.push_str(&format!("- Classification: `{:?}`\n", report.change_classification));
    out.push_str(&format!("- Required bump: `{:?}`\n", report.required_bump));
    out.push_str(&format!(
        "- Removed: {} · Added: {} · Changed: {}\n\n",
        report.removed_symbols.len(),
        report.added_symbols.len(),
        report.changed_signatures.len()
    ));
    out.push_str(&render_target_changelog_section(target_name, report));
    out
}

/// Per-target section reused by both the single-target Markdown report and
/// the multi-target changelog document: Breaking/Additive reasons, removed/
/// added/changed symbols, and enum/struct member-level detail.
#[must_use]
pub fn render_target_changelog_section(target_name: &str, report: &Report) -> String {
    let mut out = String::new();
    out.push_str(&format!("## {target_name}\n\n"));

    append_markdown_list(&mut out, "Breaking Reasons", &report.breaking_reasons);
    append_markdown_list(&mut out, "Additive Reasons", &report.additive_reasons);
    append_markdown_list(&mut out, "Removed Symbols", &report.removed_symbols);
    append_markdown_list(&mut out, "Added Symbols", &report.added_symbols);
    append_markdown_list(&mut out, "Changed Signatures", &report.changed_signatures);

    for (enum_name, change) in &report.enum_diff.changed_enums {
        let (kind, removed, added, changed) = match change {
            EnumChange::Breaking { removed_members, added_members, value_changed } => {
                ("breaking", removed_members, added_members, value_changed)
            }
            EnumChange::Additive { removed_members, added_members, value_changed } => {
                ("additive", removed_members, added_members, value_changed)
            }
            EnumChange::Unknown { reason } => {
                out.push_str(&format!("- enum `{enum_name}`: unknown change ({reason})\n"));
                continue;
            }
        };
        out.push_str(&format!(
            "- enum `{enum_name}` ({kind}): removed={removed:?}, added={added:?}, value_changed={changed:?}\n"
        ));
    }

    for (struct_name, change) in &report.struct_diff.changed_structs {
        let (kind, removed, added, changed) = match change {
            StructChange::Breaking { removed_fields, added_fields, changed_fields, .. } => {
                ("breaking", removed_fields, added_fields, changed_fields)
            }
            StructChange::Additive { removed_fields, added_fields, changed_fields, .. } => {
                ("additive", removed_fields, added_fields, changed_fields)
            }
            StructChange::Unknown { reason } => {
                out.push_str(&format!("- struct `{struct_name}`: unknown change ({reason})\n"));
                continue;
            }
        };
        out.push_str(&format!(
            "- struct `{struct_name}` ({kind}): removed={removed:?}, added={added:?}, changed={changed:?}\n"
        ));
    }

    append_markdown_list(&mut out, "Warnings", &report.warnings);
    append_markdown_list(&mut out, "Errors", &report.errors);
    out
}

/// Top-level Markdown changelog: a summary table sorted by target name, then
/// one section per target.
#[must_use]
pub fn render_changelog_document(title: &str, release_tag: Option<&str>, generated_at_utc: &str, results: &BTreeMap<String, Report>) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {title}\n\n"));
    if let Some(tag) = release_tag {
        out.push_str(&format!("Release: `{tag}`\n\n"));
    }
    out.push_str(&format!("Generated: `{generated_at_utc}`\n\n"));

    out.push_str("| Target | Status | Classification | Bump | Baseline | Current |\n");
    out.push_str("|---|---|---|---|---|---|\n");
    for (target_name, report) in results {
        out.push_str(&format!(
            "| `{target_name}` | {status} | {classification:?} | {bump:?} | {baseline} | {current} |\n",
            status = if report.status == ReportStatus::Pass { "pass" } else { "fail" },
            classification = report.change_classification,
            bump = report.required_bump,
            baseline = report.baseline_abi_version,
            current = report.current_abi_version,
        ));
    }
    out.push('\n');

    for (target_name, report) in results {
        out.push_str(&render_target_changelog_section(target_name, report));
    }
    out
}

/// Renders a minimal SARIF 2.1.0 log: one run, one result per breaking
/// reason (`ABI001`) and per policy/report error (`ABI002`), across every
/// target in `results`.
#[must_use]
pub fn render_sarif(results: &BTreeMap<String, Report>) -> serde_json::Value {
    let mut sarif_results = Vec::new();
    for (target_name, report) in results {
        for reason in &report.breaking_reasons {
            sarif_results.push(sarif_result("ABI001", "error", target_name, reason));
        }
        for error in &report.errors {
            sarif_results.push(sarif_result("ABI002", "error", target_name, error));
        }
    }

    serde_json::json!({
        "$schema": "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json",
        "version": "2.1.0",
        "runs": [{
            "tool": {
                "driver": {
                    "name": "abi-guard",
                    "informationUri": "https://github.com/EffortlessMetrics/abi-guard",
                    "rules": [
                        {"id": "ABI001", "name": "BreakingAbiChange", "shortDescription": {"text": "A breaking ABI change was detected."}},
                        {"id": "ABI002", "name": "AbiGovernanceError", "shortDescription": {"text": "An ABI governance report error was raised."}},
                    ],
                },
            },
            "results": sarif_results,
        }],
    })
}

fn sarif_result(rule_id: &str, level: &str, target_name: &str, message: &str) -> serde_json::Value {
    serde_json::json!({
        "ruleId": rule_id,
        "level": level,
        "message": {"text": message},
        "locations": [{
            "physicalLocation": {
                "artifactLocation": {"uri": target_name},
            },
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use abi_guard_types::{AbiVersion, EnumDiff, LayoutDiff, StructDiff, VersionBump};

    fn passing_report() -> Report {
        Report {
            status: ReportStatus::Pass,
            change_classification: Classification::None,
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
    fn aggregate_report_counts_pass_and_fail() {
        let mut results = BTreeMap::new();
        results.insert("widget".to_string(), passing_report());
        let mut failing = passing_report();
        failing.status = ReportStatus::Fail;
        failing.errors.push("boom".to_string());
        results.insert("gadget".to_string(), failing);

        let aggregate = AggregateReport::new("2026-07-28T00:00:00Z".to_string(), results);
        assert_eq!(aggregate.summary.target_count, 2);
        assert_eq!(aggregate.summary.pass_count, 1);
        assert_eq!(aggregate.summary.fail_count, 1);
        assert_eq!(aggregate.summary.error_count, 1);
        assert!(aggregate.has_failures());
    }

    #[test]
    fn markdown_report_includes_status_and_target() {
        let md = render_markdown_report("widget", &passing_report());
        assert!(md.starts_with("# ABI Report (pass)"));
        assert!(md.contains("## widget"));
    }

    #[test]
    fn changelog_document_lists_every_target_in_summary_table() {
        let mut results = BTreeMap::new();
        results.insert("widget".to_string(), passing_report());
        let doc = render_changelog_document("ABI Changelog", Some("v1.1.0"), "2026-07-28T00:00:00Z", &results);
        assert!(doc.contains("| `widget` |"));
        assert!(doc.contains("Release: `v1.1.0`"));
    }

    #[test]
    fn sarif_emits_one_result_per_breaking_reason() {
        let mut failing = passing_report();
        failing.breaking_reasons.push("removed symbol widget_free".to_string());
        let mut results = BTreeMap::new();
        results.insert("widget".to_string(), failing);

        let sarif = render_sarif(&results);
        let rule_ids: Vec<&str> = sarif["runs"][0]["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["ruleId"].as_str().unwrap())
            .collect();
        assert_eq!(rule_ids, vec!["ABI001"]);
    }
}
