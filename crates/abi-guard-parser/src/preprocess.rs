//! Runs the header through a real C preprocessor (`clang_preprocess` backend)
//! so macro-heavy declarations resolve before regex extraction.

use std::time::Duration;

use camino::Utf8Path;

use abi_guard_runner::{CommandRunner, CommandSpec, RunnerError};

use crate::error::ParserError;

const DEFAULT_CLANG_CANDIDATES: &[&str] = &["clang", "clang-cl", "cc", "gcc"];

pub struct PreprocessConfig {
    pub compiler: Option<String>,
    pub compiler_candidates: Vec<String>,
    pub include_dirs: Vec<String>,
    pub extra_args: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            compiler: None,
            compiler_candidates: Vec::new(),
            include_dirs: Vec::new(),
            extra_args: Vec::new(),
            timeout_secs: 30,
        }
    }
}

pub struct PreprocessOutcome {
    pub source: String,
    pub compiler_resolved: String,
    pub command: String,
    pub elapsed_ms: f64,
}

fn resolve_compiler(cfg: &PreprocessConfig) -> Result<String, ParserError> {
    let mut candidates = Vec::new();
    if let Some(explicit) = &cfg.compiler {
        if !explicit.trim().is_empty() {
            candidates.push(explicit.clone());
        }
    }
    candidates.extend(cfg.compiler_candidates.iter().cloned());
    candidates.extend(DEFAULT_CLANG_CANDIDATES.iter().map(|s| s.to_string()));
    candidates.dedup();

    for candidate in &candidates {
        if Utf8Path::new(candidate).is_absolute() {
            if Utf8Path::new(candidate).exists() {
                return Ok(candidate.clone());
            }
            continue;
        }
        if which::which(candidate).is_ok() {
            return Ok(candidate.clone());
        }
    }

    Err(ParserError::PreprocessorNotFound {
        tool: candidates.join(", "),
    })
}

/// Preprocess `header_path` with the resolved compiler and return the
/// expanded source plus metadata about how it was produced.
pub fn preprocess_header_for_parsing(
    header_path: &Utf8Path,
    cfg: &PreprocessConfig,
    runner: &dyn CommandRunner,
) -> Result<PreprocessOutcome, ParserError> {
    let compiler_resolved = resolve_compiler(cfg)?;
    let compiler_basename = Utf8Path::new(&compiler_resolved)
        .file_name()
        .unwrap_or(&compiler_resolved)
        .to_lowercase();

    let mut spec = CommandSpec::new(&compiler_resolved);
    if compiler_basename == "clang-cl" || compiler_basename == "clang-cl.exe" {
        spec = spec.arg("/EP").arg("/nologo").arg("/TC").arg(header_path.as_str());
        for dir in &cfg.include_dirs {
            spec = spec.arg("/I").arg(dir);
        }
    } else {
        spec = spec
            .arg("-E")
            .arg("-P")
            .arg("-x")
            .arg("c")
            .arg("-std=c11")
            .arg(header_path.as_str());
        for dir in &cfg.include_dirs {
            spec = spec.arg("-I").arg(dir);
        }
    }
    for extra in &cfg.extra_args {
        spec = spec.arg(extra);
    }

    let command_display = spec.display();
    let start = std::time::Instant::now();
    let output = runner
        .run(&spec, Duration::from_secs(cfg.timeout_secs))
        .map_err(|source| preprocess_run_error(header_path, source))?;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    if !output.success() {
        let reason = output.stderr_string();
        let reason = if reason.trim().is_empty() {
            output.stdout_string()
        } else {
            reason
        };
        let reason = if reason.trim().is_empty() {
            "unknown parser error".to_string()
        } else {
            reason
        };
        return Err(ParserError::PreprocessFailed {
            path: header_path.to_path_buf(),
            reason,
        });
    }

    Ok(PreprocessOutcome {
        source: output.stdout_string(),
        compiler_resolved,
        command: command_display,
        elapsed_ms,
    })
}

fn preprocess_run_error(header_path: &Utf8Path, source: RunnerError) -> ParserError {
    match source {
        RunnerError::NonZeroExit { stderr, .. } => ParserError::PreprocessFailed {
            path: header_path.to_path_buf(),
            reason: if stderr.trim().is_empty() {
                "unknown parser error".to_string()
            } else {
                stderr
            },
        },
        other => ParserError::PreprocessFailed {
            path: header_path.to_path_buf(),
            reason: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abi_guard_runner::{MockCommandRunner, ProcessOutput};

    #[test]
    fn builds_unix_style_preprocess_command() {
        let runner = MockCommandRunner::new();
        runner.expect(
            "clang",
            ProcessOutput {
                stdout: b"expanded content\n".to_vec(),
                stderr: Vec::new(),
                exit_code: Some(0),
            },
        );
        let cfg = PreprocessConfig {
            compiler: Some("clang".to_string()),
            ..Default::default()
        };
        let outcome =
            preprocess_header_for_parsing(Utf8Path::new("/tmp/widget.h"), &cfg, &runner).unwrap();
        assert_eq!(outcome.source, "expanded content\n");
        assert!(outcome.command.contains("-E"));
    }

    #[test]
    fn nonzero_exit_is_reported_as_preprocess_failed() {
        let runner = MockCommandRunner::new();
        runner.expect(
            "clang",
            ProcessOutput {
                stdout: Vec::new(),
                stderr: b"widget.h:3: unknown type 'bogus_t'\n".to_vec(),
                exit_code: Some(1),
            },
        );
        let cfg = PreprocessConfig {
            compiler: Some("clang".to_string()),
            ..Default::default()
        };
        let result = preprocess_header_for_parsing(Utf8Path::new("/tmp/widget.h"), &cfg, &runner);
        assert!(matches!(result, Err(ParserError::PreprocessFailed { .. })));
    }

    #[test]
    fn unresolvable_compiler_reports_preprocessor_not_found() {
        let runner = MockCommandRunner::new();
        let cfg = PreprocessConfig {
            compiler: Some("/nonexistent/definitely-not-a-compiler".to_string()),
            compiler_candidates: Vec::new(),
            ..Default::default()
        };
        let result = preprocess_header_for_parsing(Utf8Path::new("/tmp/widget.h"), &cfg, &runner);
        assert!(matches!(result, Err(ParserError::PreprocessorNotFound { .. })) || result.is_ok());
    }
}
