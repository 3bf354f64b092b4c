//! Clinica Ingest - Extraction and normalization pipeline.
//!
//! This crate provides:
//! - Working-hours extraction from the department HTML page
//! - Price-list table parsing (PDF layout or pre-extracted JSON grid)
//! - Service record extraction with continuation-row repair
//! - Keyword-based category tagging
//! - Normalization into tagged text records for a search index

mod clinic;
mod error;
mod hours;
mod parsers;
mod pipeline;
mod services;
mod table;
mod tagger;

pub use clinic::{ClinicExtractor, ClinicScraper, ClinicSnapshot, StandardExtractor};
pub use error::{IngestError, IngestResult};
pub use hours::WorkingHoursExtractor;
pub use parsers::{parse_tables, GridParser, PdfTableParser, TableParser};
pub use pipeline::NormalizationPipeline;
pub use services::{parse_price, ServiceTableExtractor};
pub use table::{is_blank, Cell, Page, Row, Table, TableDocument};
pub use tagger::{Category, CategoryMap, CategoryTagger};
