//! Write-if-changed drift detection (C8): compares a freshly rendered
//! artifact against what's on disk and either leaves it alone, reports
//! drift, previews the change, or writes it — depending on run mode.

use camino::Utf8Path;
use serde::Serialize;

use crate::diff::compute_unified_diff;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArtifactStatus {
    Unchanged,
    Drift,
    WouldWrite,
    Updated,
}

impl ArtifactStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unchanged => "unchanged",
            Self::Drift => "drift",
            Self::WouldWrite => "would_write",
            Self::Updated => "updated",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArtifactWriteResult {
    pub status: ArtifactStatus,
    pub diff: String,
}

fn read_text_if_exists(path: &Utf8Path) -> Result<String, crate::error::CodegenError> {
    if !path.exists() {
        return Ok(String::new());
    }
    abi_guard_utils::atomic_write::read_file_with_crlf_tolerance(path).map_err(|source| crate::error::CodegenError::ReadArtifact {
        path: path.to_path_buf(),
        source,
    })
}

/// `check=true` never touches disk, reporting `Drift` instead of writing.
/// `dry_run=true` (and not `check`) previews the write as `WouldWrite`.
/// Otherwise the artifact is written atomically and reported `Updated`.
pub fn write_artifact_if_changed(
    path: &Utf8Path,
    content: &str,
    check: bool,
    dry_run: bool,
) -> Result<ArtifactWriteResult, crate::error::CodegenError> {
    let old_content = read_text_if_exists(path)?;
    if old_content == content {
        return Ok(ArtifactWriteResult {
            status: ArtifactStatus::Unchanged,
            diff: String::new(),
        });
    }

    let old_label = format!("a/{path}");
    let new_label = format!("b/{path}");
    let diff = compute_unified_diff(&old_content, content, &old_label, &new_label);

    if check {
        return Ok(ArtifactWriteResult { status: ArtifactStatus::Drift, diff });
    }
    if dry_run {
        return Ok(ArtifactWriteResult { status: ArtifactStatus::WouldWrite, diff });
    }

    abi_guard_utils::atomic_write::write_file_atomic(path, content).map_err(|source| crate::error::CodegenError::WriteArtifact {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(ArtifactWriteResult { status: ArtifactStatus::Updated, diff })
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    fn temp_path(dir: &TempDir, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().join(name)).unwrap()
    }

    #[test]
    fn missing_file_is_unchanged_only_if_content_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = temp_path(&dir, "out.h");
        let result = write_artifact_if_changed(&path, "content", false, false).unwrap();
        assert_eq!(result.status, ArtifactStatus::Updated);
        assert!(path.exists());
    }

    #[test]
    fn check_mode_reports_drift_without_writing() {
        let dir = TempDir::new().unwrap();
        let path = temp_path(&dir, "out.h");
        let result = write_artifact_if_changed(&path, "content", true, false).unwrap();
        assert_eq!(result.status, ArtifactStatus::Drift);
        assert!(!path.exists());
    }

    #[test]
    fn dry_run_previews_without_writing() {
        let dir = TempDir::new().unwrap();
        let path = temp_path(&dir, "out.h");
        let result = write_artifact_if_changed(&path, "content", false, true).unwrap();
        assert_eq!(result.status, ArtifactStatus::WouldWrite);
        assert!(!path.exists());
    }

    #[test]
    fn identical_rewrite_is_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = temp_path(&dir, "out.h");
        write_artifact_if_changed(&path, "content", false, false).unwrap();
        let result = write_artifact_if_changed(&path, "content", false, false).unwrap();
        assert_eq!(result.status, ArtifactStatus::Unchanged);
    }
}
