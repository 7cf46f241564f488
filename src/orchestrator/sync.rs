//! `sync`: regenerates a target's IDL/native artifacts, optionally updates
//! its baseline to the just-built snapshot, and (unless skipped) runs
//! `verify` against whatever baseline is left on disk afterward.

use camino::Utf8Path;

use abi_guard_config::ConfigRaw;
use abi_guard_differ::compare_snapshots;
use abi_guard_policy::apply_policy_to_report;
use abi_guard_runner::CommandRunner;
use abi_guard_types::{Report, Snapshot};

use crate::error::AppError;
use crate::json_io;
use crate::orchestrator::generate::{self, GenerateOptions, GenerateResult};
use crate::orchestrator::target::{self, RunOverrides};

#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    pub generate: GenerateOptions,
    pub update_baselines: bool,
    pub run_verify: bool,
}

pub struct SyncResult {
    pub generate: GenerateResult,
    pub report: Option<Report>,
}

#[allow(clippy::too_many_arguments)]
pub fn sync_target(
    repo_root: &Utf8Path,
    generated_root: &Utf8Path,
    config: &ConfigRaw,
    target_name: &str,
    overrides: &RunOverrides,
    options: &SyncOptions,
    generated_at_utc: &str,
    runner: &dyn CommandRunner,
) -> Result<SyncResult, AppError> {
    let target_cfg = target::lookup_target(config, target_name)?;
    let current = target::build_current_snapshot(repo_root, target_name, target_cfg, overrides, generated_at_utc, runner)?;

    let generate_result =
        generate::generate_target(repo_root, generated_root, target_name, target_cfg, &current, &options.generate)?;

    let baseline_path = target::resolve_baseline_path(repo_root, target_name, target_cfg, overrides);
    if options.update_baselines && !options.generate.check && !options.generate.dry_run {
        json_io::write_json(&baseline_path, &current)?;
    }

    let report = if options.run_verify {
        let baseline: Snapshot = json_io::read_json(&baseline_path)?;
        let mut report = compare_snapshots(&baseline, &current);
        let policy = abi_guard_config::resolve_effective_policy(target_name, config.policy.as_ref(), target_cfg.policy.as_ref())?;
        apply_policy_to_report(&mut report, &policy, target_name)?;
        Some(report)
    } else {
        None
    };

    Ok(SyncResult { generate: generate_result, report })
}
