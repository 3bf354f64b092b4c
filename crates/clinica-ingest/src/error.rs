//! Error types for the extraction pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for extraction operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Errors that abort extraction of a whole document.
///
/// Row-level problems never surface here: malformed rows are skipped and
/// unreadable prices default to zero.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Fetch error: {0}")]
    Fetch(#[from] clinica_fetch::FetchError),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Unsupported table source: {0}")]
    UnsupportedSource(String),

    #[error("Parse error for {source_name}: {message}")]
    ParseError {
        source_name: String,
        message: String,
    },

    #[error("Table header or first data row missing")]
    MissingHeader,
}
