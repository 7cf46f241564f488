//! abi-guard - ABI governance framework for native C shared libraries.
//!
//! Parses a versioned C header, snapshots its exported surface (functions,
//! enums, structs, optionally compiler-probed struct layout and exported
//! binary symbols), diffs two snapshots into a SemVer-aware classification,
//! gates the result through configurable policy and waivers, and renders
//! native headers/export maps/IDL from the same model.

pub mod cli;
pub mod error;
pub mod exit_codes;
pub mod json_io;
pub mod orchestrator;
pub mod paths;

pub use error::AppError;
