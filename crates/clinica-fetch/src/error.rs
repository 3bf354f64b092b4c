//! Error types for document fetching.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while obtaining a source document.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Unable to reach the host.
    #[error("Connection error for {url}: {message}")]
    Connection { url: String, message: String },

    /// Request timeout.
    #[error("Request to {url} timed out after {seconds} seconds")]
    Timeout { url: String, seconds: u64 },

    /// Server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Local source file does not exist.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;
