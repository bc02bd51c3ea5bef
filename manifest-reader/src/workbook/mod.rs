//! Workbook sources
//!
//! The catalog loader only needs sheet names and a cell grid per sheet, so it
//! works against the `WorkbookSource` trait. `XlsxWorkbook` reads `.xlsx`
//! files from disk; `MemoryWorkbook` holds sheets built in code.

use crate::types::{CellValue, ManifestError, Result};

pub mod xlsx;

pub use xlsx::XlsxWorkbook;

/// Common trait for anything the catalog can be loaded from
pub trait WorkbookSource {
    /// Sheet names in workbook order
    fn sheet_names(&self) -> Vec<String>;

    /// Read one sheet by name
    fn read_sheet(&mut self, name: &str) -> Result<Sheet>;
}

/// A dense grid of cells, row-major, zero-based
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    name: String,
    rows: Vec<Vec<CellValue>>,
}

static EMPTY_CELL: CellValue = CellValue::Empty;

impl Sheet {
    /// Create an empty sheet
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Store a value, growing the grid as needed. Empty values never extend it.
    pub fn set(&mut self, row: usize, col: usize, value: CellValue) {
        if value.is_empty() && (row >= self.rows.len() || col >= self.rows[row].len()) {
            return;
        }
        if row >= self.rows.len() {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if col >= cells.len() {
            cells.resize_with(col + 1, CellValue::default);
        }
        cells[col] = value;
    }

    /// Cell at (row, col); out-of-range positions read as empty
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Number of rows up to and including the last row holding a value
    pub fn row_count(&self) -> usize {
        self.rows
            .iter()
            .rposition(|cells| cells.iter().any(|c| !c.is_empty()))
            .map_or(0, |last| last + 1)
    }
}

/// In-memory workbook, mostly useful for tests and for callers that already
/// hold the cell data
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    sheets: Vec<Sheet>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: append a sheet
    pub fn with_sheet(mut self, sheet: Sheet) -> Self {
        self.sheets.push(sheet);
        self
    }
}

impl WorkbookSource for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    fn read_sheet(&mut self, name: &str) -> Result<Sheet> {
        self.sheets
            .iter()
            .find(|s| s.name == name)
            .cloned()
            .ok_or_else(|| ManifestError::Workbook(format!("No sheet named {:?}", name)))
    }
}
