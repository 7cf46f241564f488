//! Runs external code-generator plugins against a rendered IDL file (C7).
//! abi-guard never ships builtin generators: every entry names an external
//! command template that receives the repo root, target name, and IDL path.

use std::time::Duration;

use camino::Utf8Path;

use abi_guard_runner::{CommandRunner, CommandSpec};

use crate::error::CodegenError;

#[derive(Debug, Clone)]
pub struct GeneratorEntry {
    pub name: String,
    pub command: Vec<String>,
}

/// A raw generator table entry as read from target config, before the
/// `enabled`/`kind` gate is applied.
#[derive(Debug, Clone, Default)]
pub struct RawGeneratorEntry {
    pub name: Option<String>,
    pub kind: Option<String>,
    pub enabled: bool,
    pub command: Option<Vec<String>>,
}

#[must_use]
pub fn normalize_generator_entries(target_name: &str, raw_entries: &[RawGeneratorEntry]) -> Result<Vec<GeneratorEntry>, CodegenError> {
    let mut entries = Vec::new();
    for (idx, item) in raw_entries.iter().enumerate() {
        if !item.enabled {
            continue;
        }
        let kind = item.kind.as_deref().unwrap_or("external").trim().to_lowercase();
        if kind != "external" {
            return Err(CodegenError::UnsupportedGeneratorKind {
                target: target_name.to_string(),
                index: idx,
                kind,
            });
        }
        let name = item.name.clone().unwrap_or_else(|| format!("generator_{idx}"));
        let command = match &item.command {
            Some(cmd) if !cmd.is_empty() && cmd.iter().all(|s| !s.is_empty()) => cmd.clone(),
            _ => {
                return Err(CodegenError::GeneratorCommandInvalid {
                    target: target_name.to_string(),
                    index: idx,
                })
            }
        };
        entries.push(GeneratorEntry { name, command });
    }
    Ok(entries)
}

#[derive(Debug, Clone)]
pub struct GeneratorRunResult {
    pub name: String,
    pub status: &'static str,
    pub command: String,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

fn render_token(token: &str, repo_root: &Utf8Path, target_name: &str, idl_path: &Utf8Path) -> String {
    token
        .replace("{repo_root}", repo_root.as_str())
        .replace("{target}", target_name)
        .replace("{idl}", idl_path.as_str())
}

pub fn run_generator_entry(
    repo_root: &Utf8Path,
    target_name: &str,
    generator: &GeneratorEntry,
    idl_path: &Utf8Path,
    timeout: Duration,
    runner: &dyn CommandRunner,
) -> Result<GeneratorRunResult, CodegenError> {
    let rendered: Vec<String> = generator
        .command
        .iter()
        .map(|token| render_token(token, repo_root, target_name, idl_path))
        .collect();

    let mut spec = CommandSpec::new(rendered[0].clone());
    if rendered.len() > 1 {
        spec = spec.args(rendered[1..].to_vec());
    }
    spec = spec.cwd(repo_root.as_std_path().to_path_buf());

    let output = runner.run(&spec, timeout)?;
    Ok(GeneratorRunResult {
        name: generator.name.clone(),
        status: if output.success() { "pass" } else { "fail" },
        command: rendered.join(" "),
        stdout: output.stdout_string().trim().to_string(),
        stderr: output.stderr_string().trim().to_string(),
        exit_code: output.exit_code,
    })
}

pub fn run_code_generators_for_target(
    repo_root: &Utf8Path,
    target_name: &str,
    entries: &[GeneratorEntry],
    idl_path: &Utf8Path,
    timeout: Duration,
    runner: &dyn CommandRunner,
) -> Result<Vec<GeneratorRunResult>, CodegenError> {
    entries
        .iter()
        .map(|entry| run_generator_entry(repo_root, target_name, entry, idl_path, timeout, runner))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use abi_guard_runner::{MockCommandRunner, ProcessOutput};

    #[test]
    fn rejects_non_external_kind() {
        let raw = vec![RawGeneratorEntry {
            name: Some("py-bindings".to_string()),
            kind: Some("builtin".to_string()),
            enabled: true,
            command: None,
        }];
        let err = normalize_generator_entries("widget", &raw).unwrap_err();
        assert!(matches!(err, CodegenError::UnsupportedGeneratorKind { .. }));
    }

    #[test]
    fn disabled_entries_are_skipped() {
        let raw = vec![RawGeneratorEntry {
            name: Some("py-bindings".to_string()),
            kind: Some("external".to_string()),
            enabled: false,
            command: Some(vec!["gen".to_string()]),
        }];
        let entries = normalize_generator_entries("widget", &raw).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn missing_command_is_rejected() {
        let raw = vec![RawGeneratorEntry {
            name: Some("py-bindings".to_string()),
            kind: Some("external".to_string()),
            enabled: true,
            command: None,
        }];
        let err = normalize_generator_entries("widget", &raw).unwrap_err();
        assert!(matches!(err, CodegenError::GeneratorCommandInvalid { .. }));
    }

    #[test]
    fn template_tokens_are_substituted_before_running() {
        let runner = MockCommandRunner::new();
        runner.expect(
            "gen",
            ProcessOutput {
                stdout: b"ok".to_vec(),
                stderr: Vec::new(),
                exit_code: Some(0),
            },
        );
        let entry = GeneratorEntry {
            name: "py-bindings".to_string(),
            command: vec!["gen".to_string(), "--target".to_string(), "{target}".to_string()],
        };
        let result = run_generator_entry(
            Utf8Path::new("/repo"),
            "widget",
            &entry,
            Utf8Path::new("/repo/widget.idl.json"),
            Duration::from_secs(5),
            &runner,
        )
        .unwrap();
        assert_eq!(result.status, "pass");
        assert_eq!(result.command, "gen --target widget");
    }

    #[test]
    fn nonzero_exit_is_reported_as_fail() {
        let runner = MockCommandRunner::new();
        runner.expect(
            "gen",
            ProcessOutput {
                stdout: Vec::new(),
                stderr: b"boom".to_vec(),
                exit_code: Some(1),
            },
        );
        let entry = GeneratorEntry {
            name: "py-bindings".to_string(),
            command: vec!["gen".to_string()],
        };
        let result = run_generator_entry(
            Utf8Path::new("/repo"),
            "widget",
            &entry,
            Utf8Path::new("/repo/widget.idl.json"),
            Duration::from_secs(5),
            &runner,
        )
        .unwrap();
        assert_eq!(result.status, "fail");
        assert_eq!(result.stderr, "boom");
    }
}
