//! Health checks for the environment and config a target pipeline runs
//! against: config loadability, header/binary presence, preprocessor and
//! export-tool availability, bindings coverage, and scratch-directory
//! write/rename permissions.

pub mod checks;
pub mod types;

pub use types::{CheckStatus, DoctorCheck, DoctorReport};

use camino::Utf8Path;

/// Runs every applicable check against `config_path` (resolved relative to
/// `repo_root`) and assembles a sorted [`DoctorReport`].
///
/// `emitted_at` is supplied by the caller since this crate never reads the
/// clock itself.
#[must_use]
pub fn run_doctor_checks(
    repo_root: &Utf8Path,
    config_path: &Utf8Path,
    scratch_dir: &Utf8Path,
    emitted_at: chrono::DateTime<chrono::Utc>,
) -> DoctorReport {
    let mut results = vec![
        checks::check_config_loadable(config_path),
        checks::check_export_listing_tool(),
        checks::check_write_permissions(scratch_dir),
        checks::check_atomic_rename(scratch_dir),
    ];

    if let Ok(config) = abi_guard_config::load_config(config_path) {
        for (target_name, target) in &config.targets {
            results.push(checks::check_target_header_exists(repo_root, target_name, target));
            if let Some(check) = checks::check_target_binary(repo_root, target_name, target) {
                results.push(check);
            }
            if let Some(check) = checks::check_clang_preprocessor(target_name, target) {
                results.push(check);
            }
            results.push(checks::check_bindings_configured(target_name, target));
        }
    }

    DoctorReport::from_checks(emitted_at, results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_file_still_produces_a_report_with_a_failed_check() {
        let dir = tempfile::tempdir().unwrap();
        let root = camino::Utf8Path::from_path(dir.path()).unwrap();
        let config_path = root.join("nonexistent.toml");
        let scratch = root.join(".abi-guard-doctor");
        let report = run_doctor_checks(root, &config_path, &scratch, chrono::Utc::now());
        assert!(!report.ok);
        assert!(report.checks.iter().any(|c| c.name == "config_loadable" && c.status == CheckStatus::Fail));
    }

    #[test]
    fn valid_config_produces_per_target_checks() {
        let dir = tempfile::tempdir().unwrap();
        let root = camino::Utf8Path::from_path(dir.path()).unwrap();
        std::fs::write(root.join("widget.h"), "").unwrap();
        let config_path = root.join("abi-guard.toml");
        std::fs::write(
            &config_path,
            r#"
            [targets.widget.header]
            path = "widget.h"
            api_macro = "WIDGET_API"
            call_macro = "WIDGET_CALL"
            symbol_prefix = "widget_"

            [targets.widget.header.version_macros]
            major = "WIDGET_VERSION_MAJOR"
            minor = "WIDGET_VERSION_MINOR"
            patch = "WIDGET_VERSION_PATCH"
            "#,
        )
        .unwrap();
        let scratch = root.join(".abi-guard-doctor");
        let report = run_doctor_checks(root, &config_path, &scratch, chrono::Utc::now());
        assert!(report.checks.iter().any(|c| c.name == "target.widget.header_path" && c.status == CheckStatus::Pass));
        assert!(report.checks.iter().any(|c| c.name == "target.widget.bindings_configured"));
    }
}
