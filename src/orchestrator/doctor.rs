//! `doctor`: runs environment health checks and layers on the CLI-level
//! strictness flags (`--require-baselines`, `--require-binaries`,
//! `--fail-on-warnings`) the `abi-guard-doctor` crate itself doesn't know
//! about, since those depend on `--baseline-root` and CLI overrides, not
//! just the config file.

use camino::Utf8Path;

use abi_guard_doctor::{CheckStatus, DoctorCheck, DoctorReport};

use crate::json_io;
use crate::orchestrator::target;

#[derive(Debug, Clone, Default)]
pub struct DoctorOptions {
    pub require_baselines: bool,
    pub require_binaries: bool,
    pub fail_on_warnings: bool,
}

/// Runs the crate's built-in checks, then appends a per-target baseline
/// check (when `require_baselines`) and promotes every already-recorded
/// binary-related warning to a failure (when `require_binaries`).
pub fn run(
    repo_root: &Utf8Path,
    config_path: &Utf8Path,
    scratch_dir: &Utf8Path,
    baseline_root: &Utf8Path,
    emitted_at: chrono::DateTime<chrono::Utc>,
    options: &DoctorOptions,
) -> DoctorReport {
    let mut report = abi_guard_doctor::run_doctor_checks(repo_root, config_path, scratch_dir, emitted_at);

    if let Ok(config) = abi_guard_config::load_config(config_path) {
        for target_name in config.targets.keys() {
            if options.require_baselines {
                let target_cfg = &config.targets[target_name];
                let overrides = target::RunOverrides { baseline_root: Some(baseline_root.to_path_buf()), ..Default::default() };
                let baseline_path = target::resolve_baseline_path(repo_root, target_name, target_cfg, &overrides);
                let check = if json_io::read_json::<abi_guard_types::Snapshot>(&baseline_path).is_ok() {
                    DoctorCheck::pass(format!("target.{target_name}.baseline_present"), baseline_path.to_string())
                } else {
                    DoctorCheck::fail(
                        format!("target.{target_name}.baseline_present"),
                        format!("no readable baseline at {baseline_path}"),
                    )
                };
                report.checks.push(check);
            }
        }
    }

    if options.require_binaries {
        report.checks = report
            .checks
            .into_iter()
            .map(|check| {
                if check.name.ends_with(".binary_path") && check.status == CheckStatus::Warn {
                    DoctorCheck::fail(check.name, check.details)
                } else {
                    check
                }
            })
            .collect();
    }

    if options.fail_on_warnings {
        report.checks = report
            .checks
            .into_iter()
            .map(|check| if check.status == CheckStatus::Warn { DoctorCheck::fail(check.name, check.details) } else { check })
            .collect();
    }

    report.checks.sort_by(|a, b| a.name.cmp(&b.name));
    report.ok = !report.checks.iter().any(|c| c.status == CheckStatus::Fail);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_config_still_produces_a_report() {
        let dir = TempDir::new().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        let config_path = root.join("nonexistent.toml");
        let scratch = root.join(".abi-guard-doctor");
        let baseline_root = root.join("abi").join("baselines");
        let report = run(root, &config_path, &scratch, &baseline_root, chrono::Utc::now(), &DoctorOptions::default());
        assert!(!report.ok);
    }
}
