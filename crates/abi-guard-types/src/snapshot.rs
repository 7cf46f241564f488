use serde::{Deserialize, Serialize};

use crate::binary::{BindingsPayload, BinaryPayload};
use crate::header::{HeaderPayload, TypePolicy};
use crate::version::AbiVersion;

pub const TOOL_NAME: &str = "abi_guard";
pub const TOOL_VERSION: &str = "1.0.0";
pub const SNAPSHOT_SCHEMA_KIND: &str = "snapshot";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolIdentity {
    pub name: String,
    pub version: String,
}

impl Default for ToolIdentity {
    fn default() -> Self {
        Self {
            name: TOOL_NAME.to_string(),
            version: TOOL_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotPolicy {
    pub type_policy: TypePolicy,
    pub strict_semver: bool,
}

/// The versioned, serializable record produced by the snapshot builder (C2)
/// for one target and compared against a baseline by the differ (C3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub tool: ToolIdentity,
    pub target: String,
    pub generated_at_utc: String,
    pub policy: SnapshotPolicy,
    pub abi_version: AbiVersion,
    pub header: HeaderPayload,
    pub bindings: BindingsPayload,
    pub binary: BinaryPayload,
}
