use camino::Utf8PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    #[error("bindings.generators[{index}] for target '{target}' must be an object")]
    GeneratorEntryNotAnObject { target: String, index: usize },
    #[error("bindings.generators[{index}].command for target '{target}' must be a non-empty string array")]
    GeneratorCommandInvalid { target: String, index: usize },
    #[error("bindings.generators[{index}].kind for target '{target}' must be 'external'")]
    UnsupportedGeneratorKind { target: String, index: usize, kind: String },
    #[error("builtin generator '{builtin}' is not supported for target '{target}'; use kind=\"external\"")]
    BuiltinGeneratorUnsupported { target: String, builtin: String },
    #[error("unable to read artifact '{path}': {source}")]
    ReadArtifact { path: Utf8PathBuf, source: anyhow::Error },
    #[error("unable to write artifact '{path}': {source}")]
    WriteArtifact { path: Utf8PathBuf, source: anyhow::Error },
    #[error(transparent)]
    Runner(#[from] abi_guard_runner::RunnerError),
}
