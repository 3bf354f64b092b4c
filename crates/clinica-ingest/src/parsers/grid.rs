//! JSON table grids produced by external table extractors.
//!
//! The shape is `pages[tables[rows[cells]]]`; a cell is a string, a number
//! or `null`.

use super::TableParser;
use crate::error::{IngestError, IngestResult};
use crate::table::{Cell, Page, Row, Table, TableDocument};
use serde_json::Value;
use tracing::debug;

/// Parser for pre-extracted JSON grids.
pub struct GridParser;

impl GridParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GridParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TableParser for GridParser {
    fn parse(&self, bytes: &[u8], source_name: &str) -> IngestResult<TableDocument> {
        let error = |message: String| IngestError::ParseError {
            source_name: source_name.to_string(),
            message,
        };

        let root: Value = serde_json::from_slice(bytes).map_err(|e| error(e.to_string()))?;

        let pages = as_array(&root, "document").map_err(error)?;
        let mut document = TableDocument::default();
        for page in pages {
            let mut tables = Vec::new();
            for table in as_array(page, "page").map_err(error)? {
                let rows = as_array(table, "table")
                    .map_err(error)?
                    .iter()
                    .map(to_row)
                    .collect::<Result<Vec<Row>, String>>()
                    .map_err(error)?;
                tables.push(Table::new(rows));
            }
            document.pages.push(Page::new(tables));
        }

        debug!(
            "Loaded grid with {} pages, {} rows",
            document.pages.len(),
            document.row_count()
        );
        Ok(document)
    }

    fn extensions(&self) -> &[&str] {
        &["json"]
    }

    fn sniff(&self, bytes: &[u8]) -> bool {
        bytes
            .iter()
            .find(|b| !b.is_ascii_whitespace())
            .is_some_and(|b| *b == b'[')
    }
}

fn as_array<'a>(value: &'a Value, what: &str) -> Result<&'a Vec<Value>, String> {
    value
        .as_array()
        .ok_or_else(|| format!("expected {} to be an array, found {}", what, value))
}

fn to_row(value: &Value) -> Result<Row, String> {
    as_array(value, "row")?.iter().map(to_cell).collect()
}

fn to_cell(value: &Value) -> Result<Cell, String> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(format!("unsupported cell value {}", other)),
    }
}
