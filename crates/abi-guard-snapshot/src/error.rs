use camino::Utf8PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to query binary exports: {0}")]
    ExportQueryFailed(String),

    #[error("no export listing tool found on PATH; install one of: nm, llvm-nm, readelf, objdump, dumpbin")]
    NoExportToolFound,

    #[error("parser error: {0}")]
    Parser(#[from] abi_guard_parser::ParserError),

    #[error("unable to read header '{path}': {source}")]
    ReadHeader {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}
