//! Snapshot differ and SemVer policy (C3/C4): compares a baseline and
//! current [`abi_guard_types::Snapshot`] and classifies the resulting
//! change as none/additive/breaking.

pub mod compare;
pub mod enums;
pub mod layout;
pub mod structs;

pub use compare::{classify_change, compare_snapshots, recommended_version, validate_version_policy};
pub use enums::compare_enum_sets;
pub use layout::compare_layout_probes;
pub use structs::compare_struct_sets;
