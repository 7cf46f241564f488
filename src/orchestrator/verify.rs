//! `verify` / `verify-all`: build a target's current snapshot, diff it
//! against its stored baseline, gate the result through policy, and report.

use std::collections::BTreeMap;

use camino::Utf8Path;

use abi_guard_config::ConfigRaw;
use abi_guard_differ::compare_snapshots;
use abi_guard_policy::apply_policy_to_report;
use abi_guard_runner::CommandRunner;
use abi_guard_types::{Report, Snapshot};

use crate::error::AppError;
use crate::json_io;
use crate::orchestrator::report::AggregateReport;
use crate::orchestrator::target::{self, RunOverrides};

/// Loads the stored baseline snapshot for `target_name`, building the
/// current snapshot, comparing the two, and gating the result through the
/// target's effective policy.
pub fn verify_target(
    repo_root: &Utf8Path,
    config: &ConfigRaw,
    target_name: &str,
    overrides: &RunOverrides,
    generated_at_utc: &str,
    runner: &dyn CommandRunner,
) -> Result<(Snapshot, Report), AppError> {
    let target_cfg = target::lookup_target(config, target_name)?;
    let baseline_path = target::resolve_baseline_path(repo_root, target_name, target_cfg, overrides);
    let baseline: Snapshot = json_io::read_json(&baseline_path)?;

    let current = target::build_current_snapshot(repo_root, target_name, target_cfg, overrides, generated_at_utc, runner)?;

    let mut report = compare_snapshots(&baseline, &current);
    let policy = abi_guard_config::resolve_effective_policy(target_name, config.policy.as_ref(), target_cfg.policy.as_ref())?;
    apply_policy_to_report(&mut report, &policy, target_name)?;

    Ok((current, report))
}

/// Runs [`verify_target`] for every target in `config`, in sorted name
/// order (`ConfigRaw::targets` is a `BTreeMap`), collecting per-target
/// reports into an [`AggregateReport`]. A single target's fatal error
/// (missing baseline, unreadable header, ...) aborts the whole run, matching
/// the original implementation's fail-fast batch behaviour.
pub fn verify_all(
    repo_root: &Utf8Path,
    config: &ConfigRaw,
    overrides: &RunOverrides,
    generated_at_utc: &str,
    runner: &dyn CommandRunner,
) -> Result<AggregateReport, AppError> {
    if config.targets.is_empty() {
        return Err(AppError::NoTargets);
    }

    let mut results = BTreeMap::new();
    for target_name in config.targets.keys() {
        let (_, report) = verify_target(repo_root, config, target_name, overrides, generated_at_utc, runner)?;
        results.insert(target_name.clone(), report);
    }
    Ok(AggregateReport::new(generated_at_utc.to_string(), results))
}
