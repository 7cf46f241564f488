//! Artifact renderer and drift detector (C7/C8): renders the canonical
//! native C header and linker export map from an IDL payload, runs external
//! codegen plugins against it, and writes artifacts only when their
//! rendered content actually changed.

pub mod artifact;
pub mod diff;
pub mod error;
pub mod export_map;
pub mod generators;
pub mod native_header;

pub use artifact::{write_artifact_if_changed, ArtifactStatus, ArtifactWriteResult};
pub use diff::{compute_unified_diff, normalized_lines};
pub use error::CodegenError;
pub use export_map::render_native_export_map_from_idl;
pub use generators::{
    normalize_generator_entries, run_code_generators_for_target, run_generator_entry, GeneratorEntry,
    GeneratorRunResult, RawGeneratorEntry,
};
pub use native_header::{
    collect_callback_typedef_declarations, collect_native_constants, collect_opaque_type_declarations,
    render_c_parameter_for_declaration, render_native_header_from_idl, NativeHeaderConfig,
};
