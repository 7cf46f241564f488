//! `diff`: compares two already-built snapshot files directly, with no
//! config or policy involved — just the raw [`compare_snapshots`] verdict,
//! optionally promoted to a failure when it carries warnings.

use camino::Utf8Path;

use abi_guard_differ::compare_snapshots;
use abi_guard_types::{Report, ReportStatus, Snapshot};

use crate::error::AppError;
use crate::json_io;

/// Loads `baseline_path` and `current_path` as snapshots, diffs them, and
/// (when `fail_on_warnings`) demotes a pass with warnings to a failure.
pub fn diff_snapshots(baseline_path: &Utf8Path, current_path: &Utf8Path, fail_on_warnings: bool) -> Result<Report, AppError> {
    let baseline: Snapshot = json_io::read_json(baseline_path)?;
    let current: Snapshot = json_io::read_json(current_path)?;

    let mut report = compare_snapshots(&baseline, &current);
    if fail_on_warnings && !report.warnings.is_empty() {
        report.status = ReportStatus::Fail;
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_baseline_file_is_a_read_error() {
        let err = diff_snapshots(Utf8Path::new("/nonexistent/baseline.json"), Utf8Path::new("/nonexistent/current.json"), false)
            .unwrap_err();
        assert!(matches!(err, AppError::ReadFile { .. }));
    }
}
