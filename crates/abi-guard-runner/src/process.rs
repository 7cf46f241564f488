use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::command_spec::CommandSpec;
use crate::error::RunnerError;

/// Output of a finished child process.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub exit_code: Option<i32>,
}

impl ProcessOutput {
    #[must_use]
    pub fn stdout_string(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    #[must_use]
    pub fn stderr_string(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Abstraction over child-process execution.
///
/// Every subprocess abi-guard launches (clang/cc preprocessing, `nm`/`readelf`/
/// `dumpbin` export dumps, layout-probe compilation, external codegen plugins)
/// goes through this trait, so the pipeline can be driven end-to-end in tests
/// against a [`MockCommandRunner`] without touching the real toolchain.
pub trait CommandRunner: Send + Sync {
    fn run(&self, cmd: &CommandSpec, timeout: Duration) -> Result<ProcessOutput, RunnerError>;
}

/// Runs commands via `std::process::Command`, polling for completion so a
/// timeout can be enforced without pulling in an async runtime.
#[derive(Debug, Default)]
pub struct SystemCommandRunner {
    poll_interval: Duration,
}

impl SystemCommandRunner {
    #[must_use]
    pub fn new() -> Self {
        Self {
            poll_interval: Duration::from_millis(20),
        }
    }
}

impl CommandRunner for SystemCommandRunner {
    fn run(&self, cmd: &CommandSpec, timeout: Duration) -> Result<ProcessOutput, RunnerError> {
        let mut child = cmd
            .to_command()
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .spawn()
            .map_err(|e| RunnerError::SpawnFailed {
                program: cmd.display(),
                reason: e.to_string(),
            })?;

        let started = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    let mut stdout = Vec::new();
                    let mut stderr = Vec::new();
                    if let Some(mut out) = child.stdout.take() {
                        let _ = std::io::Read::read_to_end(&mut out, &mut stdout);
                    }
                    if let Some(mut err) = child.stderr.take() {
                        let _ = std::io::Read::read_to_end(&mut err, &mut stderr);
                    }
                    return Ok(ProcessOutput {
                        stdout,
                        stderr,
                        exit_code: status.code(),
                    });
                }
                Ok(None) => {
                    if started.elapsed() >= timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(RunnerError::Timeout {
                            program: cmd.display(),
                            timeout_secs: timeout.as_secs(),
                        });
                    }
                    std::thread::sleep(self.poll_interval);
                }
                Err(e) => {
                    return Err(RunnerError::SpawnFailed {
                        program: cmd.display(),
                        reason: e.to_string(),
                    });
                }
            }
        }
    }
}

/// Deterministic stand-in for [`CommandRunner`], keyed by the program name.
///
/// Used throughout the snapshot-builder and artifact-renderer test suites so
/// export-probe, layout-probe, and external-generator behavior can be
/// exercised without depending on what's installed on the machine running
/// the tests.
#[derive(Default)]
pub struct MockCommandRunner {
    responses: Mutex<HashMap<String, Result<ProcessOutput, RunnerError>>>,
    calls: Mutex<Vec<String>>,
}

impl MockCommandRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect(&self, program: &str, output: ProcessOutput) {
        self.responses
            .lock()
            .expect("mock runner mutex poisoned")
            .insert(program.to_string(), Ok(output));
    }

    pub fn expect_failure(&self, program: &str, err: RunnerError) {
        self.responses
            .lock()
            .expect("mock runner mutex poisoned")
            .insert(program.to_string(), Err(err));
    }

    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("mock runner mutex poisoned").clone()
    }
}

impl CommandRunner for MockCommandRunner {
    fn run(&self, cmd: &CommandSpec, _timeout: Duration) -> Result<ProcessOutput, RunnerError> {
        let program = cmd.program.to_string_lossy().into_owned();
        self.calls
            .lock()
            .expect("mock runner mutex poisoned")
            .push(cmd.display());
        match self
            .responses
            .lock()
            .expect("mock runner mutex poisoned")
            .get(&program)
        {
            Some(Ok(out)) => Ok(out.clone()),
            Some(Err(_)) => Err(RunnerError::ToolNotFound { tool: program }),
            None => Err(RunnerError::ToolNotFound { tool: program }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_runner_captures_stdout_and_exit_code() {
        let runner = SystemCommandRunner::new();
        let cmd = CommandSpec::new("true");
        let out = runner.run(&cmd, Duration::from_secs(5)).unwrap();
        assert!(out.success());
    }

    #[test]
    fn system_runner_reports_timeout() {
        let runner = SystemCommandRunner::new();
        let cmd = CommandSpec::new("sleep").arg("5");
        let result = runner.run(&cmd, Duration::from_millis(50));
        assert!(matches!(result, Err(RunnerError::Timeout { .. })));
    }

    #[test]
    fn mock_runner_replays_expected_output() {
        let mock = MockCommandRunner::new();
        mock.expect(
            "nm",
            ProcessOutput {
                stdout: b"0000000000001130 T rtc_session_create\n".to_vec(),
                stderr: Vec::new(),
                exit_code: Some(0),
            },
        );
        let out = mock
            .run(&CommandSpec::new("nm").arg("-g"), Duration::from_secs(1))
            .unwrap();
        assert!(out.stdout_string().contains("rtc_session_create"));
        assert_eq!(mock.calls(), vec!["nm -g".to_string()]);
    }

    #[test]
    fn mock_runner_errors_on_unexpected_program() {
        let mock = MockCommandRunner::new();
        let result = mock.run(&CommandSpec::new("objdump"), Duration::from_secs(1));
        assert!(matches!(result, Err(RunnerError::ToolNotFound { .. })));
    }
}
