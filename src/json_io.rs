//! JSON file I/O shared by every command: pretty-printed, sorted-key,
//! trailing-newline documents written atomically, mirroring the original
//! implementation's `write_json` helper.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Reads and deserializes a JSON document. `serde_json::Map` is BTreeMap-backed
/// in this workspace (no `preserve_order` feature), so round-tripping through
/// `read_json`/`write_json` already normalizes key order.
pub fn read_json<T: DeserializeOwned>(path: &Utf8Path) -> Result<T, AppError> {
    let raw = std::fs::read_to_string(path).map_err(|source| AppError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| AppError::ParseJson {
        path: path.to_path_buf(),
        source,
    })
}

/// Serializes `value` as pretty-printed JSON with a trailing newline and
/// writes it atomically (temp file + fsync + rename), creating parent
/// directories as needed.
pub fn write_json<T: Serialize>(path: &Utf8Path, value: &T) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| AppError::WriteFile {
            path: path.to_path_buf(),
            source,
        })?;
    }
    let mut body = serde_json::to_string_pretty(value).map_err(|source| AppError::ParseJson {
        path: path.to_path_buf(),
        source,
    })?;
    body.push('\n');
    abi_guard_utils::atomic_write::write_file_atomic(path, &body).map_err(|source| AppError::WriteFile {
        path: path.to_path_buf(),
        source: std::io::Error::other(source.to_string()),
    })?;
    Ok(())
}

/// Default baseline path for a target: `abi/baselines/<target>.json`.
#[must_use]
pub fn default_baseline_path(baseline_root: &Utf8Path, target_name: &str) -> Utf8PathBuf {
    baseline_root.join(format!("{target_name}.json"))
}

/// Default IDL output path for a target: `abi/generated/<target>.idl.json`.
#[must_use]
pub fn default_idl_path(generated_root: &Utf8Path, target_name: &str) -> Utf8PathBuf {
    generated_root.join(format!("{target_name}.idl.json"))
}
