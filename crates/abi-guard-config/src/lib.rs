//! Configuration model, discovery, and validation (C5): typed targets,
//! policy, and codegen sections loaded from a TOML config file and resolved
//! into the domain types the rest of the workspace consumes.

pub mod error;
pub mod load;
pub mod model;
pub mod resolve;
pub mod validate;

pub use error::ConfigError;
pub use load::{load_config, save_config};
pub use model::{
    BindingsRaw, BinaryRaw, CodegenRaw, ConfigRaw, GeneratorRaw, HeaderParserRaw, HeaderRaw, LayoutRaw, PolicyRaw,
    TargetRaw, TypePolicyRaw, VersionMacrosRaw, WaiverRequirementsRaw,
};
pub use resolve::{
    bindings_expected_symbols, build_type_policy, generator_entry_names, resolve_effective_policy,
    resolve_generator_entries, resolve_header_parser_config, resolve_idl_build_config, resolve_layout_probe_config,
    resolve_native_header_config,
};
pub use validate::validate_config;
