//! Synchronous, argv-style child process execution.
//!
//! Every external tool abi-guard shells out to (a preprocessor, an export-symbol
//! dumper, a C compiler for layout probing, an external codegen plugin) goes
//! through [`CommandRunner`] so callers can run against a [`MockCommandRunner`]
//! in tests instead of touching the real filesystem and PATH.

pub mod command_spec;
pub mod error;
pub mod process;

pub use command_spec::CommandSpec;
pub use error::RunnerError;
pub use process::{CommandRunner, MockCommandRunner, ProcessOutput, SystemCommandRunner};
