//! Table-grid parsers for price-list sources.

mod grid;
mod pdf;

pub use grid::GridParser;
pub use pdf::PdfTableParser;

use crate::error::{IngestError, IngestResult};
use crate::table::TableDocument;

/// Trait for parsers that turn raw bytes into a page/table grid.
pub trait TableParser: Send + Sync {
    /// Parse a document's bytes; `source_name` is used in error messages.
    fn parse(&self, bytes: &[u8], source_name: &str) -> IngestResult<TableDocument>;

    /// Get the supported file extensions.
    fn extensions(&self) -> &[&str];

    /// Check if this parser supports the given extension.
    fn supports(&self, extension: &str) -> bool {
        self.extensions()
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }

    /// Check whether the bytes look like this parser's format.
    fn sniff(&self, bytes: &[u8]) -> bool;
}

/// Parse a table source, choosing the parser by extension, then by content.
pub fn parse_tables(bytes: &[u8], source_name: &str) -> IngestResult<TableDocument> {
    let parsers: [&dyn TableParser; 2] = [&PdfTableParser::new(), &GridParser::new()];

    let extension = source_name
        .rsplit('/')
        .next()
        .and_then(|file| file.rsplit_once('.'))
        .map(|(_, ext)| ext)
        .unwrap_or("");

    let parser = parsers
        .iter()
        .find(|p| p.supports(extension))
        .or_else(|| parsers.iter().find(|p| p.sniff(bytes)))
        .ok_or_else(|| IngestError::UnsupportedSource(source_name.to_string()))?;

    parser.parse(bytes, source_name)
}
