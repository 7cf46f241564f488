//! Root error type aggregating every crate's error enum behind `#[from]`
//! conversions, plus the handful of orchestration-level failure modes
//! (policy/report verdicts, drift) that don't originate inside a crate.

use camino::Utf8PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] abi_guard_config::ConfigError),

    #[error(transparent)]
    Parser(#[from] abi_guard_parser::ParserError),

    #[error(transparent)]
    Snapshot(#[from] abi_guard_snapshot::SnapshotError),

    #[error(transparent)]
    Policy(#[from] abi_guard_policy::PolicyError),

    #[error(transparent)]
    Codegen(#[from] abi_guard_codegen::CodegenError),

    #[error("unable to read '{path}': {source}")]
    ReadFile {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to write '{path}': {source}")]
    WriteFile {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to parse JSON document '{path}': {source}")]
    ParseJson {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unable to serialize JSON document: {0}")]
    EmitJson(#[from] abi_guard_types::FingerprintError),

    #[error("unknown target '{0}'")]
    UnknownTarget(String),

    #[error("config has no targets")]
    NoTargets,

    #[error("{0}")]
    PolicyFailure(String),

    #[error("{0}")]
    DriftFailure(String),

    #[error("'{0}' is not yet implemented")]
    Unsupported(&'static str),
}
