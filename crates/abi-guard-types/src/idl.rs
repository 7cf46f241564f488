use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::header::{CallbackTypedef, HeaderEnum, HeaderStruct};
use crate::version::AbiVersion;

pub const IDL_SCHEMA_VERSION: u32 = 1;
pub const IDL_SCHEMA_URI_V1: &str = "https://abi-guard.dev/schema/idl.v1.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdlParameter {
    pub name: String,
    pub c_type: String,
    pub pointer_depth: usize,
    pub variadic: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Availability {
    pub since_abi: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdlFunction {
    pub name: String,
    pub c_return_type: String,
    pub c_parameters_raw: String,
    pub parameters: Vec<IdlParameter>,
    pub c_signature: String,
    pub documentation: String,
    pub deprecated: bool,
    pub availability: Availability,
    pub stable_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdlSource {
    pub header_path: String,
    pub parser_backend: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdlSummary {
    pub function_count: usize,
    pub enum_count: usize,
    pub struct_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdlHeaderTypes {
    pub enums: BTreeMap<String, HeaderEnum>,
    pub structs: BTreeMap<String, HeaderStruct>,
    pub opaque_types: Vec<String>,
    pub opaque_type_declarations: Vec<String>,
    pub callback_typedefs: Vec<CallbackTypedef>,
    pub constants: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdlCodegenInfo {
    pub enabled: bool,
    pub include_symbols: Vec<String>,
    pub exclude_symbols: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdlToolIdentity {
    pub name: String,
    pub version: String,
}

/// Language-neutral Interface Description Language payload (C6) rendered
/// from a [`crate::snapshot::Snapshot`], consumed by artifact renderers and
/// external codegen plugins (C7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Idl {
    pub idl_schema_version: u32,
    pub idl_schema: String,
    pub tool: IdlToolIdentity,
    pub content_fingerprint: String,
    pub target: String,
    pub abi_version: AbiVersion,
    pub source: IdlSource,
    pub summary: IdlSummary,
    pub functions: Vec<IdlFunction>,
    pub header_types: IdlHeaderTypes,
    pub codegen: IdlCodegenInfo,
}
