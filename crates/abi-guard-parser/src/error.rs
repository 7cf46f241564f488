use camino::Utf8PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("unable to read header '{path}': {source}")]
    ReadHeader {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("required macro '{macro_name}' was not found in '{path}'")]
    MissingVersionMacro { path: Utf8PathBuf, macro_name: String },

    #[error("no ABI functions were found in '{path}' with macros '{api_macro}'/'{call_macro}'")]
    NoFunctionsFound {
        path: Utf8PathBuf,
        api_macro: String,
        call_macro: String,
    },

    #[error("header '{path}' backend 'clang_preprocess' failed: {reason}")]
    PreprocessFailed { path: Utf8PathBuf, reason: String },

    #[error("preprocessor tool '{tool}' not found on PATH")]
    PreprocessorNotFound { tool: String },

    #[error(transparent)]
    Runner(#[from] abi_guard_runner::RunnerError),
}
