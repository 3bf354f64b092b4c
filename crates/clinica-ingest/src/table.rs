//! Page → table → row → cell grid handed to the service extractor.

/// A single table cell; `None` when the cell is absent from the layout.
pub type Cell = Option<String>;

/// A table row. All rows of a well-formed table share the header's width.
pub type Row = Vec<Cell>;

/// One table on a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }
}

/// One page of a tabular document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub tables: Vec<Table>,
}

impl Page {
    pub fn new(tables: Vec<Table>) -> Self {
        Self { tables }
    }
}

/// A whole tabular document, pages in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableDocument {
    pub pages: Vec<Page>,
}

impl TableDocument {
    pub fn new(pages: Vec<Page>) -> Self {
        Self { pages }
    }

    /// Total number of rows across all pages and tables.
    pub fn row_count(&self) -> usize {
        self.pages
            .iter()
            .flat_map(|p| &p.tables)
            .map(|t| t.rows.len())
            .sum()
    }
}

/// True for absent cells and cells holding only whitespace.
pub fn is_blank(cell: &Cell) -> bool {
    cell.as_deref().map_or(true, |s| s.trim().is_empty())
}

/// Build a row from string literals; `""` becomes an empty (present) cell.
#[cfg(test)]
pub(crate) fn row(cells: &[&str]) -> Row {
    cells.iter().map(|c| Some(c.to_string())).collect()
}
