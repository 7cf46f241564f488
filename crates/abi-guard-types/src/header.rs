use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::fingerprint::stable_hash;

/// Which symbol-name/kind filters apply when scanning enums and structs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypePolicy {
    pub enable_enums: bool,
    pub enable_structs: bool,
    pub enum_name_pattern: String,
    pub struct_name_pattern: String,
    pub ignore_enums: Vec<String>,
    pub ignore_structs: Vec<String>,
    pub struct_tail_addition_is_breaking: bool,
}

impl Default for TypePolicy {
    fn default() -> Self {
        Self {
            enable_enums: true,
            enable_structs: true,
            enum_name_pattern: String::new(),
            struct_name_pattern: String::new(),
            ignore_enums: Vec::new(),
            ignore_structs: Vec::new(),
            struct_tail_addition_is_breaking: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderFunction {
    pub return_type: String,
    pub parameters: String,
    pub signature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: String,
    pub value: Option<i64>,
    pub value_expr: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderEnum {
    pub member_count: usize,
    pub members: Vec<EnumMember>,
    pub fingerprint: String,
}

impl HeaderEnum {
    #[must_use]
    pub fn from_members(members: Vec<EnumMember>) -> Self {
        let fingerprint = stable_hash(&members);
        Self {
            member_count: members.len(),
            members,
            fingerprint,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructField {
    pub name: String,
    pub declaration: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderStruct {
    pub field_count: usize,
    pub fields: Vec<StructField>,
    pub fingerprint: String,
}

impl HeaderStruct {
    #[must_use]
    pub fn from_fields(fields: Vec<StructField>) -> Self {
        let fingerprint = stable_hash(&fields);
        Self {
            field_count: fields.len(),
            fields,
            fingerprint,
        }
    }
}

/// `typedef struct foo foo;` opaque handle declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpaqueHandleTypedef {
    pub name: String,
    pub declaration: String,
}

/// `typedef void (CALL *prefix_xxx_cb)(...)` function-pointer typedef.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackTypedef {
    pub name: String,
    pub declaration: String,
}

/// Record of which parser backend actually produced a header snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserInfo {
    pub backend_requested: String,
    pub backend: String,
    pub fallback_used: bool,
    pub parse_mode: String,
    #[serde(default)]
    pub details: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutProbePayload {
    pub enabled: bool,
    pub available: bool,
    pub reason: Option<String>,
    pub compiler: Option<String>,
    #[serde(default)]
    pub errors: Vec<String>,
    /// struct name -> probed layout
    #[serde(default)]
    pub structs: BTreeMap<String, StructLayout>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructLayout {
    pub size: u64,
    pub alignment: u64,
    /// field name -> byte offset
    pub offsets: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderPayload {
    pub path: String,
    pub function_count: usize,
    pub symbols: Vec<String>,
    pub functions: BTreeMap<String, HeaderFunction>,
    pub enum_count: usize,
    pub enums: BTreeMap<String, HeaderEnum>,
    pub struct_count: usize,
    pub structs: BTreeMap<String, HeaderStruct>,
    pub opaque_types: Vec<String>,
    pub opaque_type_declarations: Vec<String>,
    pub callback_typedefs: Vec<CallbackTypedef>,
    pub constants: BTreeMap<String, String>,
    pub parser: ParserInfo,
    pub layout_probe: LayoutProbePayload,
}
