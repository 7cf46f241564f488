//! Shared data model for abi-guard: the typed records every other crate in
//! the workspace (parser, snapshot builder, differ, policy engine, IDL
//! builder, artifact renderer) reads and writes.
//!
//! Everything here is a plain, serializable record built through explicit
//! constructors — nothing here reaches for a "live" default-constructed
//! snapshot or report; a thin validation layer sits at the config/CLI edges
//! instead (see `abi-guard-config`).

pub mod binary;
pub mod fingerprint;
pub mod header;
pub mod idl;
pub mod policy;
pub mod report;
pub mod snapshot;
pub mod version;

pub use binary::{BindingsPayload, BinaryPayload, ToolInvocation};
pub use fingerprint::{emit_jcs, stable_hash, FingerprintError};
pub use header::{
    CallbackTypedef, EnumMember, HeaderEnum, HeaderFunction, HeaderPayload, HeaderStruct,
    LayoutProbePayload, OpaqueHandleTypedef, ParserInfo, StructField, StructLayout, TypePolicy,
};
pub use idl::{
    Availability, Idl, IdlCodegenInfo, IdlFunction, IdlHeaderTypes, IdlParameter, IdlSource,
    IdlSummary, IdlToolIdentity, IDL_SCHEMA_URI_V1, IDL_SCHEMA_VERSION,
};
pub use policy::{
    EffectivePolicy, PolicyRule, PolicyWaiver, RuleCondition, Severity, WaiverRequirements,
};
pub use report::{
    AppliedRule, AppliedWaiver, Classification, EnumChange, EnumDiff, LayoutDiff, Report,
    ReportStatus, StructChange, StructDiff,
};
pub use snapshot::{Snapshot, SnapshotPolicy, ToolIdentity, TOOL_NAME, TOOL_VERSION};
pub use version::{AbiVersion, VersionBump};
