//! Clinica Fetch - Retrieval of source documents.
//!
//! Sources are either `http(s)://` URLs, fetched with an async `reqwest`
//! client, or paths on the local filesystem.

mod client;
mod error;

pub use client::{DocumentFetcher, DocumentSource};
pub use error::{FetchError, FetchResult};
