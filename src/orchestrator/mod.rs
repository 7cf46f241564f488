//! Orchestration: wires config resolution, snapshot building, diffing,
//! policy gating, codegen, and reporting into the commands exposed on the
//! CLI.

pub mod changelog;
pub mod diff;
pub mod doctor;
pub mod generate;
pub mod report;
pub mod sync;
pub mod target;
pub mod targets;
pub mod verify;
pub mod waiver_audit;

pub use target::{build_current_snapshot, lookup_target, resolve_baseline_path, RunOverrides};
