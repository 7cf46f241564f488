//! Command-line surface: one `clap` subcommand per orchestrator entry
//! point, plus the global flags (`--log-format`, `-v/--verbose`) shared by
//! all of them.

pub mod args;
pub mod run;

pub use run::run;
