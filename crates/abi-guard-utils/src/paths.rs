//! Path helpers shared by the snapshot builder, renderer, and drift detector.

use camino::{Utf8Path, Utf8PathBuf};

/// Resolve a config-supplied path value against a root.
///
/// Absolute values are returned unchanged; relative values are joined to
/// `root`. Used for header/artifact/baseline paths that may be given either
/// relative to the config file or as an absolute override.
#[must_use]
pub fn ensure_relative_path(root: &Utf8Path, value: &str) -> Utf8PathBuf {
    let candidate = Utf8Path::new(value);
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        root.join(candidate)
    }
}

/// Render `path` relative to `repo_root` for display/storage in artifacts,
/// falling back to the path unchanged if it isn't under the root.
#[must_use]
pub fn to_repo_relative(path: &Utf8Path, repo_root: &Utf8Path) -> String {
    match path.strip_prefix(repo_root) {
        Ok(relative) => relative.to_string(),
        Err(_) => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_value_is_joined_to_root() {
        let root = Utf8Path::new("/repo");
        assert_eq!(
            ensure_relative_path(root, "include/widget.h"),
            Utf8PathBuf::from("/repo/include/widget.h")
        );
    }

    #[test]
    fn absolute_value_is_returned_unchanged() {
        let root = Utf8Path::new("/repo");
        assert_eq!(
            ensure_relative_path(root, "/other/widget.h"),
            Utf8PathBuf::from("/other/widget.h")
        );
    }

    #[test]
    fn to_repo_relative_strips_root_prefix() {
        let repo_root = Utf8Path::new("/repo");
        let path = Utf8Path::new("/repo/include/widget.h");
        assert_eq!(to_repo_relative(path, repo_root), "include/widget.h");
    }

    #[test]
    fn to_repo_relative_falls_back_to_absolute_outside_root() {
        let repo_root = Utf8Path::new("/repo");
        let path = Utf8Path::new("/other/widget.h");
        assert_eq!(to_repo_relative(path, repo_root), "/other/widget.h");
    }
}
