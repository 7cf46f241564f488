//! IDL builder (C6): renders a language-neutral interface description from
//! an ABI snapshot, consumed by the artifact renderer and external codegen
//! plugins (C7).

pub mod filter;
pub mod functions;
pub mod opaque;
pub mod payload;

pub use filter::{include_symbol_for_codegen, CodegenSymbolFilter};
pub use functions::build_function_idl_records;
pub use opaque::{derive_opaque_type_names_from_idl, is_c_typedef_name};
pub use payload::{build_idl_payload, IdlBuildConfig};
