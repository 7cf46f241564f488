//! C header parser (C1): extracts function, enum, struct, opaque-handle,
//! callback-typedef, and constant declarations out of a prefixed C header,
//! either via lightweight regexes or a real preprocessor pass.

pub mod enums;
pub mod error;
pub mod header;
pub mod int_expr;
pub mod lexical;
pub mod opaque;
pub mod params;
pub mod preprocess;
pub mod structs;

pub use enums::parse_enum_blocks;
pub use error::ParserError;
pub use header::{extract_define_int, parse_c_header, HeaderParseConfig, ParserBackend, VersionMacros};
pub use opaque::{extract_callback_typedefs, extract_opaque_struct_typedefs, extract_prefixed_define_constants};
pub use params::{parse_c_function_parameters, parse_c_parameter_decl, split_c_parameters};
pub use preprocess::{preprocess_header_for_parsing, PreprocessConfig, PreprocessOutcome};
pub use structs::parse_struct_blocks;
