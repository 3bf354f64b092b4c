//! Service price-list extraction from a page/table grid.
//!
//! Rows are processed strictly in document order: a row whose name cell is
//! blank continues the previously accepted row, so the extraction is a fold
//! carrying that row forward.

use crate::error::{IngestError, IngestResult};
use crate::table::{is_blank, Row, TableDocument};
use clinica_config::ExtractionConfig;
use clinica_core::ServiceRecord;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, trace};

static DECIMAL_COMMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+),(\d{2})$").unwrap());

const ARTICLE_COLUMN: usize = 0;
const CODE_COLUMN: usize = 1;
const NAME_COLUMN: usize = 2;
const PRICE_COLUMN: usize = 3;

/// Converts price-list rows into [`ServiceRecord`]s.
#[derive(Debug, Clone)]
pub struct ServiceTableExtractor {
    initial_marker: String,
    followup_marker: String,
    max_empty_fields: usize,
}

/// Accumulator threaded through the row fold.
#[derive(Debug, Default)]
struct Carry {
    last_row: Option<Row>,
    records: Vec<ServiceRecord>,
}

impl ServiceTableExtractor {
    pub fn new(
        initial_marker: impl Into<String>,
        followup_marker: impl Into<String>,
        max_empty_fields: usize,
    ) -> Self {
        Self {
            initial_marker: initial_marker.into(),
            followup_marker: followup_marker.into(),
            max_empty_fields,
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(
            &config.initial_marker,
            &config.followup_marker,
            config.max_empty_fields,
        )
    }

    /// Extract all services from the document.
    ///
    /// Row 0 of the first table on the first page is the header; row 1 seeds
    /// the continuation state and is itself converted like any other row.
    pub fn extract(&self, document: &TableDocument) -> IngestResult<Vec<ServiceRecord>> {
        let first_table = document
            .pages
            .first()
            .and_then(|page| page.tables.first())
            .ok_or(IngestError::MissingHeader)?;
        let header = first_table
            .rows
            .first()
            .filter(|h| !h.is_empty())
            .ok_or(IngestError::MissingHeader)?;
        let seed = first_table.rows.get(1).ok_or(IngestError::MissingHeader)?;

        let rows = document
            .pages
            .iter()
            .enumerate()
            .flat_map(|(page_idx, page)| {
                page.tables.iter().enumerate().flat_map(move |(table_idx, table)| {
                    let skip = usize::from(page_idx == 0 && table_idx == 0);
                    table.rows.iter().skip(skip)
                })
            });

        let init = Carry {
            last_row: Some(seed.clone()),
            records: Vec::new(),
        };
        let carry = rows.fold(init, |carry, row| self.step(carry, header, row));

        debug!(
            "Extracted {} services from {} rows",
            carry.records.len(),
            document.row_count()
        );
        Ok(carry.records)
    }

    fn step(&self, mut carry: Carry, header: &Row, row: &Row) -> Carry {
        if row.len() != header.len() {
            debug!(
                "Skipping row with {} cells (header has {})",
                row.len(),
                header.len()
            );
            return carry;
        }
        if row == header {
            trace!("Skipping repeated header row");
            return carry;
        }

        let row = self.repair(carry.last_row.as_ref(), row);
        match self.convert(&row) {
            Some(record) => {
                carry.records.push(record);
                carry.last_row = Some(row);
            }
            None => trace!("Skipping noise row {:?}", row),
        }
        carry
    }

    /// Fill a blank name from the previous row, turning an initial visit
    /// into a follow-up one.
    fn repair(&self, last_row: Option<&Row>, row: &Row) -> Row {
        let mut row = row.clone();
        let previous_name = last_row.and_then(|r| r.get(NAME_COLUMN)).and_then(Option::as_ref);

        if let (Some(cell), Some(previous)) = (row.get_mut(NAME_COLUMN), previous_name) {
            if is_blank(cell) {
                *cell = Some(previous.replace(&self.initial_marker, &self.followup_marker));
            }
        }
        row
    }

    /// Turn a row into a record, or `None` when it is mostly empty.
    pub fn convert(&self, row: &Row) -> Option<ServiceRecord> {
        let empty_fields = row.iter().filter(|cell| is_blank(cell)).count();
        if empty_fields > self.max_empty_fields {
            return None;
        }

        let name = normalize_spaces(cell_text(row, NAME_COLUMN));
        if name.is_empty() {
            return None;
        }

        Some(ServiceRecord::new(
            cell_text(row, ARTICLE_COLUMN).trim(),
            cell_text(row, CODE_COLUMN).trim(),
            name,
            parse_price(row.get(PRICE_COLUMN).and_then(Option::as_deref)),
        ))
    }
}

fn cell_text(row: &Row, index: usize) -> &str {
    row.get(index).and_then(Option::as_deref).unwrap_or("")
}

/// Collapse wrapped cell text (`"Приём\nврача"`) onto one line.
fn normalize_spaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse a price like `"1 200"` or `"950,50"`; anything unreadable is `0.0`.
///
/// A comma is a decimal separator only before exactly two trailing digits,
/// so `"1,200"` is unreadable rather than `1.2`.
pub fn parse_price(cell: Option<&str>) -> f64 {
    let Some(raw) = cell else {
        return 0.0;
    };
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let compact = DECIMAL_COMMA_RE.replace(&compact, "$1.$2");

    match compact.parse::<f64>() {
        Ok(price) if price.is_finite() && price >= 0.0 => price,
        _ => {
            trace!("Unreadable price {:?}", raw);
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{row, Page, Table};

    fn extractor() -> ServiceTableExtractor {
        ServiceTableExtractor::from_config(&ExtractionConfig::default())
    }

    fn header() -> Row {
        row(&["Артикул", "Код", "Наименование", "Цена"])
    }

    fn single_table(rows: Vec<Row>) -> TableDocument {
        TableDocument::new(vec![Page::new(vec![Table::new(rows)])])
    }

    #[test]
    fn test_single_row() {
        let doc = single_table(vec![
            header(),
            row(&["101", "K5", "Консультация терапевта", "1 200"]),
        ]);
        let records = extractor().extract(&doc).unwrap();
        assert_eq!(
            records,
            vec![ServiceRecord::new("101", "K5", "Консультация терапевта", 1200.0)]
        );
        assert_eq!(
            records[0].to_string(),
            "Консультация терапевта Цена: 1200.0 рублей"
        );
    }

    #[test]
    fn test_continuation_repair() {
        let doc = single_table(vec![
            header(),
            row(&["1", "C1", "Приём кардиолога первичный", "2300"]),
            vec![
                Some("2".into()),
                Some("C1".into()),
                None,
                Some("1600".into()),
            ],
        ]);
        let records = extractor().extract(&doc).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].name, "Приём кардиолога повторный");
        assert_eq!(records[1].price, 1600.0);
    }

    #[test]
    fn test_repair_across_page_boundary() {
        let doc = TableDocument::new(vec![
            Page::new(vec![Table::new(vec![
                header(),
                row(&["1", "N1", "Приём невролога первичный", "2000"]),
            ])]),
            Page::new(vec![Table::new(vec![row(&["2", "N1", "", "1500"])])]),
        ]);
        let records = extractor().extract(&doc).unwrap();
        assert_eq!(records[1].name, "Приём невролога повторный");
    }

    #[test]
    fn test_noise_row_keeps_carry_over() {
        let doc = single_table(vec![
            header(),
            row(&["1", "C1", "Приём кардиолога первичный", "2300"]),
            row(&["", "", "Кардиология", ""]),
            row(&["2", "C1", "", "1600"]),
        ]);
        let records = extractor().extract(&doc).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].name, "Приём кардиолога повторный");
    }

    #[test]
    fn test_width_mismatch_skipped() {
        let doc = single_table(vec![
            header(),
            row(&["1", "A", "Рентген", "900"]),
            row(&["2", "B", "УЗИ"]),
            row(&["3", "C", "ЭКГ", "500"]),
        ]);
        let names: Vec<_> = extractor()
            .extract(&doc)
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Рентген", "ЭКГ"]);
    }

    #[test]
    fn test_repeated_header_skipped() {
        let doc = TableDocument::new(vec![
            Page::new(vec![Table::new(vec![header(), row(&["1", "A", "Рентген", "900"])])]),
            Page::new(vec![Table::new(vec![header(), row(&["2", "B", "УЗИ", "1100"])])]),
        ]);
        assert_eq!(extractor().extract(&doc).unwrap().len(), 2);
    }

    #[test]
    fn test_second_table_keeps_first_row() {
        let doc = TableDocument::new(vec![Page::new(vec![
            Table::new(vec![header(), row(&["1", "A", "Рентген", "900"])]),
            Table::new(vec![
                row(&["2", "B", "УЗИ", "1100"]),
                row(&["3", "C", "ЭКГ", "500"]),
            ]),
        ])]);
        let names: Vec<_> = extractor()
            .extract(&doc)
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Рентген", "УЗИ", "ЭКГ"]);
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(
            extractor().extract(&TableDocument::default()),
            Err(IngestError::MissingHeader)
        ));
        assert!(matches!(
            extractor().extract(&single_table(vec![header()])),
            Err(IngestError::MissingHeader)
        ));
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price(Some("1 200")), 1200.0);
        assert_eq!(parse_price(Some("950,50")), 950.5);
        assert_eq!(parse_price(Some("1,200")), 0.0);
        assert_eq!(parse_price(Some("1 200,00")), 1200.0);
        assert_eq!(parse_price(Some("2\u{a0}300.00")), 2300.0);
        assert_eq!(parse_price(Some("n/a")), 0.0);
        assert_eq!(parse_price(Some("-5")), 0.0);
        assert_eq!(parse_price(None), 0.0);
    }

    #[test]
    fn test_convert_rejects_mostly_empty() {
        assert!(extractor().convert(&row(&["", "", "", "100"])).is_none());
        let record = extractor().convert(&row(&["", "", "Осмотр", "n/a"])).unwrap();
        assert_eq!(record.price, 0.0);
    }

    #[test]
    fn test_wrapped_name_normalized() {
        let record = extractor()
            .convert(&row(&["5", "X", "Приём\nврача  общей практики", "700"]))
            .unwrap();
        assert_eq!(record.name, "Приём врача общей практики");
    }
}
