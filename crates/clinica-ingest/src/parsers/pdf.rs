//! PDF price-list parser.
//!
//! The PDF text is split into pages on form feeds. The first line with at
//! least [`MIN_HEADER_COLUMNS`] column segments is taken as the header and
//! fixes the column layout; every later non-blank line becomes a row whose
//! segments are placed under the header column they overlap most. Blank
//! lines end a table.

use super::TableParser;
use crate::error::{IngestError, IngestResult};
use crate::table::{Page, Row, Table, TableDocument};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Runs of text separated by single spaces; two or more spaces split columns.
static SEGMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S+(?:[ \t]\S+)*").unwrap());

/// Minimum number of segments for a line to qualify as the header.
pub const MIN_HEADER_COLUMNS: usize = 4;

/// Parser for PDF price lists.
pub struct PdfTableParser;

impl PdfTableParser {
    /// Create a new PDF parser.
    pub fn new() -> Self {
        Self
    }

    /// Build the grid from already-extracted text.
    pub fn parse_text(&self, text: &str) -> TableDocument {
        let mut layout: Option<ColumnLayout> = None;
        // Set while the table holding the header line has no other rows.
        let mut unconfirmed = false;
        let mut document = TableDocument::default();

        for page_text in text.split('\x0C') {
            let mut page = Page::default();
            let mut current = Table::default();

            for line in page_text.lines() {
                if line.trim().is_empty() {
                    close_table(&mut page, &mut current, &mut layout, &mut unconfirmed);
                    continue;
                }

                let segments = segments(line);
                if let Some(layout) = &layout {
                    current.rows.push(layout.split(&segments));
                    unconfirmed = false;
                } else if segments.len() >= MIN_HEADER_COLUMNS {
                    let header = ColumnLayout::from_segments(&segments);
                    current.rows.push(header.split(&segments));
                    layout = Some(header);
                    unconfirmed = true;
                }
            }

            close_table(&mut page, &mut current, &mut layout, &mut unconfirmed);
            document.pages.push(page);
        }

        // Drop a trailing empty page left by a final form feed.
        if document.pages.last().is_some_and(|p| p.tables.is_empty()) && document.pages.len() > 1 {
            document.pages.pop();
        }
        document
    }
}

/// Finish the current table. A header line standing alone was a wide
/// preamble line, so its layout is forgotten and the next candidate is tried.
fn close_table(
    page: &mut Page,
    current: &mut Table,
    layout: &mut Option<ColumnLayout>,
    unconfirmed: &mut bool,
) {
    if current.rows.is_empty() {
        return;
    }
    let table = std::mem::take(current);
    if *unconfirmed {
        debug!("Discarding lone header candidate {:?}", table.rows[0]);
        *layout = None;
        *unconfirmed = false;
        return;
    }
    page.tables.push(table);
}

impl Default for PdfTableParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TableParser for PdfTableParser {
    fn parse(&self, bytes: &[u8], source_name: &str) -> IngestResult<TableDocument> {
        debug!("Parsing PDF: {}", source_name);

        let text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
            IngestError::ParseError {
                source_name: source_name.to_string(),
                message: format!("Failed to extract text from PDF: {}", e),
            }
        })?;

        let document = self.parse_text(&text);
        debug!(
            "Extracted {} pages, {} rows from PDF",
            document.pages.len(),
            document.row_count()
        );
        Ok(document)
    }

    fn extensions(&self) -> &[&str] {
        &["pdf"]
    }

    fn sniff(&self, bytes: &[u8]) -> bool {
        bytes.starts_with(b"%PDF")
    }
}

/// A text segment and its character span within the line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    start: usize,
    end: usize,
    text: String,
}

fn segments(line: &str) -> Vec<Segment> {
    SEGMENT_RE
        .find_iter(line)
        .map(|m| {
            let start = line[..m.start()].chars().count();
            Segment {
                start,
                end: start + m.as_str().chars().count(),
                text: m.as_str().to_string(),
            }
        })
        .collect()
}

/// Column start offsets learned from the header line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ColumnLayout {
    starts: Vec<usize>,
}

impl ColumnLayout {
    fn from_segments(segments: &[Segment]) -> Self {
        Self {
            starts: segments.iter().map(|s| s.start).collect(),
        }
    }

    fn width(&self) -> usize {
        self.starts.len()
    }

    /// Span of column `idx` as a half-open character range.
    fn span(&self, idx: usize) -> (usize, usize) {
        let start = if idx == 0 { 0 } else { self.starts[idx] };
        let end = self.starts.get(idx + 1).copied().unwrap_or(usize::MAX);
        (start, end)
    }

    fn column_for(&self, segment: &Segment) -> usize {
        (0..self.width())
            .map(|idx| {
                let (start, end) = self.span(idx);
                let overlap = segment.end.min(end).saturating_sub(segment.start.max(start));
                (idx, overlap)
            })
            .fold((0, 0), |best, candidate| if candidate.1 > best.1 { candidate } else { best })
            .0
    }

    fn split(&self, segments: &[Segment]) -> Row {
        let mut row: Row = vec![None; self.width()];
        for segment in segments {
            let cell = &mut row[self.column_for(segment)];
            match cell {
                Some(existing) => {
                    existing.push(' ');
                    existing.push_str(&segment.text);
                }
                None => *cell = Some(segment.text.clone()),
            }
        }
        row
    }
}
