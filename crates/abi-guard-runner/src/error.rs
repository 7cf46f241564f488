use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("tool not found on PATH: {tool}")]
    ToolNotFound { tool: String },

    #[error("failed to spawn {program}: {reason}")]
    SpawnFailed { program: String, reason: String },

    #[error("execution of {program} timed out after {timeout_secs}s")]
    Timeout { program: String, timeout_secs: u64 },

    #[error("{program} exited with status {code:?}: {stderr}")]
    NonZeroExit {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
}
