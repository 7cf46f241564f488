//! Queries a compiled shared library for its exported symbols via whichever
//! platform export-listing tool (`nm`, `llvm-nm`, `readelf`, `objdump`,
//! `dumpbin`) is available, then canonicalizes names against the configured
//! symbol prefix.

use std::collections::BTreeSet;
use std::time::Duration;

use camino::Utf8Path;
use once_cell::sync::Lazy;
use regex::Regex;

use abi_guard_runner::{CommandRunner, CommandSpec};
use abi_guard_types::{BinaryPayload, ToolInvocation};

use crate::error::SnapshotError;

static DUMPBIN_EXPORT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s+\d+\s+[0-9A-Fa-f]+\s+[0-9A-Fa-f]+\s+(\S+)$").unwrap());
static HEX_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9A-Fa-f]+$").unwrap());

#[must_use]
pub fn parse_nm_exports(output: &str) -> Vec<String> {
    let mut exports: BTreeSet<String> = BTreeSet::new();
    for raw_line in output.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.ends_with(':') {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 2 {
            continue;
        }
        let type_code = parts[parts.len() - 2];
        let symbol = parts[parts.len() - 1];
        if symbol == "|" || symbol == "<" {
            continue;
        }
        if type_code.chars().count() != 1 {
            continue;
        }
        if type_code == "U" {
            continue;
        }
        let ch = type_code.chars().next().unwrap();
        if !(ch.is_ascii_uppercase() || type_code == "u") {
            continue;
        }
        exports.insert(symbol.to_string());
    }
    exports.into_iter().collect()
}

#[must_use]
pub fn parse_dumpbin_exports(output: &str) -> Vec<String> {
    let mut exports: BTreeSet<String> = BTreeSet::new();
    for raw_line in output.lines() {
        let line = raw_line.trim_end();
        if let Some(caps) = DUMPBIN_EXPORT_LINE.captures(line) {
            exports.insert(caps[1].to_string());
        }
    }
    exports.into_iter().collect()
}

#[must_use]
pub fn parse_readelf_exports(output: &str) -> Vec<String> {
    let mut exports: BTreeSet<String> = BTreeSet::new();
    for raw_line in output.lines() {
        let line = raw_line.trim_end();
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 8 {
            continue;
        }
        let number_token = parts[0];
        if !number_token.ends_with(':') || !number_token[..number_token.len() - 1].chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        let bind = parts[4].to_uppercase();
        let visibility = parts[5].to_uppercase();
        let section = parts[6].to_uppercase();
        let name = parts[7];
        if section == "UND" {
            continue;
        }
        if !matches!(bind.as_str(), "GLOBAL" | "WEAK" | "GNU_UNIQUE" | "UNIQUE") {
            continue;
        }
        if matches!(visibility.as_str(), "HIDDEN" | "INTERNAL") {
            continue;
        }
        if !name.is_empty() && name != "0" {
            exports.insert(name.to_string());
        }
    }
    exports.into_iter().collect()
}

#[must_use]
pub fn parse_objdump_exports(output: &str) -> Vec<String> {
    let mut exports: BTreeSet<String> = BTreeSet::new();
    for raw_line in output.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 7 {
            continue;
        }
        if !HEX_TOKEN.is_match(parts[0]) {
            continue;
        }
        let binding = parts[1].to_lowercase();
        if !matches!(binding.as_str(), "g" | "w" | "u") {
            continue;
        }
        let section = parts[3];
        if section == "*UND*" {
            continue;
        }
        let name = parts[parts.len() - 1];
        if !name.is_empty() && name != "*UND*" {
            exports.insert(name.to_string());
        }
    }
    exports.into_iter().collect()
}

#[must_use]
pub fn canonicalize_prefixed_symbol(symbol: &str, symbol_prefix: &str) -> Option<String> {
    let mut base = symbol.strip_prefix('_').unwrap_or(symbol).to_string();
    if let Some(at_idx) = base.rfind('@') {
        let (left, right) = base.split_at(at_idx);
        let right = &right[1..];
        if !right.is_empty() && right.chars().all(|c| c.is_ascii_digit()) {
            base = left.to_string();
        }
    }
    if !symbol_prefix.is_empty() && !base.starts_with(symbol_prefix) {
        return None;
    }
    Some(base)
}

struct ExportCommandSpec {
    tool_name: &'static str,
    command: Vec<String>,
    parse_format: &'static str,
}

fn build_export_command_specs(binary_path: &Utf8Path) -> Vec<ExportCommandSpec> {
    let path = binary_path.as_str().to_string();
    if cfg!(target_os = "linux") {
        vec![
            ExportCommandSpec {
                tool_name: "nm",
                command: vec!["nm".into(), "-D".into(), "--defined-only".into(), path.clone()],
                parse_format: "nm",
            },
            ExportCommandSpec {
                tool_name: "llvm-nm",
                command: vec!["llvm-nm".into(), "-D".into(), "--defined-only".into(), path.clone()],
                parse_format: "nm",
            },
            ExportCommandSpec {
                tool_name: "readelf",
                command: vec!["readelf".into(), "-Ws".into(), path.clone()],
                parse_format: "readelf",
            },
            ExportCommandSpec {
                tool_name: "objdump",
                command: vec!["objdump".into(), "-T".into(), path.clone()],
                parse_format: "objdump",
            },
        ]
    } else if cfg!(target_os = "macos") {
        vec![
            ExportCommandSpec {
                tool_name: "nm",
                command: vec!["nm".into(), "-gU".into(), path.clone()],
                parse_format: "nm",
            },
            ExportCommandSpec {
                tool_name: "llvm-nm",
                command: vec!["llvm-nm".into(), "-gU".into(), path.clone()],
                parse_format: "nm",
            },
        ]
    } else if cfg!(target_os = "windows") {
        vec![
            ExportCommandSpec {
                tool_name: "dumpbin",
                command: vec!["dumpbin".into(), "/exports".into(), path.clone()],
                parse_format: "dumpbin",
            },
            ExportCommandSpec {
                tool_name: "llvm-nm",
                command: vec!["llvm-nm".into(), "--defined-only".into(), path.clone()],
                parse_format: "nm",
            },
            ExportCommandSpec {
                tool_name: "nm",
                command: vec!["nm".into(), "--defined-only".into(), path.clone()],
                parse_format: "nm",
            },
        ]
    } else {
        vec![
            ExportCommandSpec {
                tool_name: "nm",
                command: vec!["nm".into(), "--defined-only".into(), path.clone()],
                parse_format: "nm",
            },
            ExportCommandSpec {
                tool_name: "llvm-nm",
                command: vec!["llvm-nm".into(), "--defined-only".into(), path.clone()],
                parse_format: "nm",
            },
            ExportCommandSpec {
                tool_name: "objdump",
                command: vec!["objdump".into(), "-T".into(), path.clone()],
                parse_format: "objdump",
            },
        ]
    }
}

/// Export-listing tool names tried, in order, on this platform. Exposed for
/// diagnostics that want to report whether any of them is on `PATH` without
/// running a binary through [`list_binary_exports`].
#[must_use]
pub fn candidate_export_tool_names() -> Vec<&'static str> {
    build_export_command_specs(Utf8Path::new("placeholder"))
        .into_iter()
        .map(|spec| spec.tool_name)
        .collect()
}

fn parse_exports_with_format(output: &str, parse_format: &str) -> Vec<String> {
    match parse_format {
        "dumpbin" => parse_dumpbin_exports(output),
        "readelf" => parse_readelf_exports(output),
        "objdump" => parse_objdump_exports(output),
        _ => parse_nm_exports(output),
    }
}

/// Run the first available export-listing tool for this platform against
/// `binary_path` and canonicalize its symbols against `symbol_prefix`.
pub fn extract_binary_exports(
    binary_path: &Utf8Path,
    symbol_prefix: &str,
    allow_non_prefixed_exports: bool,
    runner: &dyn CommandRunner,
) -> Result<BinaryPayload, SnapshotError> {
    if !binary_path.exists() {
        return Ok(BinaryPayload {
            path: Some(binary_path.to_string()),
            ..BinaryPayload::not_configured()
        });
    }

    let specs = build_export_command_specs(binary_path);
    let mut tools_info = Vec::new();
    let mut tool_errors = Vec::new();
    let mut raw_exports: BTreeSet<String> = BTreeSet::new();

    for spec in specs {
        if which::which(spec.command[0].as_str()).is_err() {
            continue;
        }
        let mut cmd = CommandSpec::new(spec.command[0].as_str());
        cmd = cmd.args(spec.command.iter().skip(1).cloned());
        match runner.run(&cmd, Duration::from_secs(30)) {
            Ok(output) if output.success() => {
                let parsed = parse_exports_with_format(&output.stdout_string(), spec.parse_format);
                let export_count = parsed.len();
                raw_exports = parsed.into_iter().collect();
                tools_info.push(ToolInvocation {
                    tool: spec.tool_name.to_string(),
                    command: cmd.display(),
                    parse_format: spec.parse_format.to_string(),
                    export_count,
                });
                break;
            }
            Ok(output) => {
                let message = output.stderr_string();
                let message = if message.trim().is_empty() {
                    output.stdout_string()
                } else {
                    message
                };
                tool_errors.push(format!("{}: {}", cmd.display(), message.trim()));
            }
            Err(err) => {
                tool_errors.push(format!("{}: {}", cmd.display(), err));
            }
        }
    }

    if tools_info.is_empty() {
        if !tool_errors.is_empty() {
            return Err(SnapshotError::ExportQueryFailed(tool_errors.join(" | ")));
        }
        return Err(SnapshotError::NoExportToolFound);
    }

    let mut canonical_symbols: BTreeSet<String> = BTreeSet::new();
    let mut non_prefixed = Vec::new();
    let mut decorated_exports = Vec::new();

    for raw_symbol in &raw_exports {
        let normalized = raw_symbol.strip_prefix('_').unwrap_or(raw_symbol);
        let ends_in_at_digits = normalized
            .rfind('@')
            .map(|idx| normalized[idx + 1..].chars().all(|c| c.is_ascii_digit()) && idx + 1 < normalized.len())
            .unwrap_or(false);
        if normalized != raw_symbol || ends_in_at_digits {
            decorated_exports.push(raw_symbol.clone());
        }
        match canonicalize_prefixed_symbol(raw_symbol, symbol_prefix) {
            Some(canonical) => {
                canonical_symbols.insert(canonical);
            }
            None => non_prefixed.push(raw_symbol.clone()),
        }
    }

    let decorated_export_count = decorated_exports.len();
    decorated_exports.sort();
    decorated_exports.truncate(50);

    Ok(BinaryPayload {
        available: true,
        path: Some(binary_path.to_string()),
        tool: tools_info.first().map(|t| t.command.clone()),
        tools: tools_info,
        symbol_count: canonical_symbols.len(),
        symbols: canonical_symbols.into_iter().collect(),
        raw_export_count: raw_exports.len(),
        non_prefixed_export_count: non_prefixed.len(),
        non_prefixed_exports: non_prefixed,
        allow_non_prefixed_exports,
        decorated_export_count,
        decorated_exports,
        potential_calling_convention_mismatch: decorated_export_count > 0 && !cfg!(target_os = "windows"),
        export_tool_error_count: tool_errors.len(),
        export_tool_errors: tool_errors,
        skipped: false,
        reason: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_nm_exports_keeps_global_text_symbols() {
        let output = "0000000000001130 T widget_init\n0000000000001140 t widget_private\n                 U widget_external\n";
        let exports = parse_nm_exports(output);
        assert_eq!(exports, vec!["widget_init".to_string()]);
    }

    #[test]
    fn parse_readelf_exports_skips_undefined_and_hidden() {
        let output = "     3: 0000000000001130     8 FUNC    GLOBAL DEFAULT   12 widget_init\n     4: 0000000000000000     0 FUNC    GLOBAL DEFAULT  UND widget_external\n";
        let exports = parse_readelf_exports(output);
        assert_eq!(exports, vec!["widget_init".to_string()]);
    }

    #[test]
    fn parse_objdump_exports_skips_undefined() {
        let output = "0000000000001130 g     F .text\t0000000000000010  widget_init\n0000000000000000       F *UND*\t0000000000000000  widget_external\n";
        let exports = parse_objdump_exports(output);
        assert_eq!(exports, vec!["widget_init".to_string()]);
    }

    #[test]
    fn canonicalize_prefixed_symbol_strips_underscore_and_stdcall_decoration() {
        assert_eq!(
            canonicalize_prefixed_symbol("_widget_init@4", "widget_"),
            Some("widget_init".to_string())
        );
        assert_eq!(canonicalize_prefixed_symbol("other_symbol", "widget_"), None);
    }

    #[test]
    fn extract_binary_exports_reports_unavailable_for_missing_binary() {
        use abi_guard_runner::MockCommandRunner;
        let runner = MockCommandRunner::new();
        let payload =
            extract_binary_exports(Utf8Path::new("/nonexistent/libwidget.so"), "widget_", false, &runner).unwrap();
        assert!(!payload.available);
    }
}
