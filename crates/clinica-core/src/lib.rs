//! Clinica Core - Domain types for the clinic extraction pipeline.

mod error;
mod types;

pub use error::{Error, Result};
pub use types::*;
