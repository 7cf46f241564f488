//! Loads, persists, and validates a config file on disk. Format is sniffed
//! by extension (`.json` parses as JSON, everything else as TOML), matching
//! the config sources the original implementation accepted.

use camino::Utf8Path;

use crate::error::ConfigError;
use crate::model::ConfigRaw;
use crate::validate::validate_config;

fn is_json_path(path: &Utf8Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Reads `path`, parses it as JSON or TOML depending on its extension, and
/// runs semantic validation. Returns the raw model; callers resolve
/// individual targets via [`crate::resolve`].
pub fn load_config(path: &Utf8Path) -> Result<ConfigRaw, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let config: ConfigRaw = if is_json_path(path) {
        serde_json::from_str(&text).map_err(|source| ConfigError::ParseJson {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source: Box::new(source),
        })?
    };

    validate_config(&config)?;
    Ok(config)
}

/// Serializes `config` as pretty-printed, sorted-key JSON (regardless of
/// `path`'s own extension) and writes it to `path`, creating parent
/// directories as needed. Used by commands that bootstrap or regenerate
/// config entries (`init-target`); hand-authored TOML configs are never
/// rewritten in TOML to avoid losing comments or formatting.
pub fn save_config(path: &Utf8Path, config: &ConfigRaw) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    let mut body = serde_json::to_string_pretty(config).map_err(|source| ConfigError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    body.push('\n');
    std::fs::write(path, body).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    fn write_temp(content: &str) -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("abi-guard.toml")).unwrap();
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn loads_a_minimal_valid_config() {
        let (_dir, path) = write_temp(
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
        );
        let config = load_config(&path).unwrap();
        assert_eq!(config.targets.len(), 1);
        assert!(config.targets.contains_key("widget"));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let path = Utf8PathBuf::from("/nonexistent/abi-guard.toml");
        assert!(matches!(load_config(&path), Err(ConfigError::Read { .. })));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let (_dir, path) = write_temp("this is not [ valid toml");
        assert!(matches!(load_config(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn config_with_no_targets_fails_validation() {
        let (_dir, path) = write_temp("");
        assert!(matches!(load_config(&path), Err(ConfigError::NoTargets)));
    }

    #[test]
    fn json_extension_is_parsed_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("abi-guard.json")).unwrap();
        std::fs::write(
            &path,
            r#"{"targets":{"widget":{"header":{"path":"widget.h","api_macro":"WIDGET_API","call_macro":"WIDGET_CALL","symbol_prefix":"widget_","version_macros":{"major":"WIDGET_VERSION_MAJOR","minor":"WIDGET_VERSION_MINOR","patch":"WIDGET_VERSION_PATCH"}}}}}"#,
        )
        .unwrap();
        let config = load_config(&path).unwrap();
        assert!(config.targets.contains_key("widget"));
    }

    #[test]
    fn save_then_load_round_trips() {
        let (_dir, path) = write_temp(
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
        );
        let config = load_config(&path).unwrap();
        let json_path = path.with_extension("json");
        save_config(&json_path, &config).unwrap();
        let reloaded = load_config(&json_path).unwrap();
        assert_eq!(reloaded.targets.len(), config.targets.len());
    }
}
