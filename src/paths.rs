//! Repo-relative path conventions for persisted state: baselines, generated
//! IDL, and native artifacts all live under a fixed `abi/` directory tree
//! relative to `--repo-root`, never a hidden per-user home directory.

use camino::{Utf8Path, Utf8PathBuf};

/// `abi/baselines` under `repo_root`, the default baseline directory when a
/// target doesn't set `baseline_path` and no `--baseline-root` override is given.
#[must_use]
pub fn default_baseline_root(repo_root: &Utf8Path) -> Utf8PathBuf {
    repo_root.join("abi").join("baselines")
}

/// `abi/generated` under `repo_root`, the default directory for rendered IDL
/// and native artifacts.
#[must_use]
pub fn default_generated_root(repo_root: &Utf8Path) -> Utf8PathBuf {
    repo_root.join("abi").join("generated")
}

/// Resolves `value` against `repo_root` unless it is already absolute.
#[must_use]
pub fn resolve(repo_root: &Utf8Path, value: &str) -> Utf8PathBuf {
    abi_guard_utils::paths::ensure_relative_path(repo_root, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_roots_nest_under_abi() {
        let root = Utf8Path::new("/repo");
        assert_eq!(default_baseline_root(root), Utf8PathBuf::from("/repo/abi/baselines"));
        assert_eq!(default_generated_root(root), Utf8PathBuf::from("/repo/abi/generated"));
    }
}
