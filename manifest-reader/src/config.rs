//! Sheet layout configuration
//!
//! A route sheet carries its header text in the first row and its stop rows
//! between a fixed number of leading header rows and trailing footer rows.
//! The defaults match the manifests produced by the dispatch portal.

use crate::types::{ManifestError, Result};
use serde::{Deserialize, Serialize};

/// Column of the first header cell (row 0)
pub const HEADER_LEAD_COLUMN: usize = 0;

/// Column of the second header cell (row 0), appended after one space
pub const HEADER_TAIL_COLUMN: usize = 4;

/// Where the stop table lives inside a route sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetLayout {
    /// Rows skipped before the first stop
    #[serde(default = "default_header_rows")]
    pub header_rows: usize,

    /// Trailing rows after the last stop
    #[serde(default = "default_footer_rows")]
    pub footer_rows: usize,

    /// Zero-based column of the stop identifier
    #[serde(default = "default_trid_column")]
    pub trid_column: usize,

    /// Zero-based column of the delivery window
    #[serde(default = "default_time_window_column")]
    pub time_window_column: usize,

    /// Zero-based column of the address
    #[serde(default = "default_address_column")]
    pub address_column: usize,
}

fn default_header_rows() -> usize {
    3
}

fn default_footer_rows() -> usize {
    1
}

fn default_trid_column() -> usize {
    1
}

fn default_time_window_column() -> usize {
    4
}

fn default_address_column() -> usize {
    5
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            header_rows: default_header_rows(),
            footer_rows: default_footer_rows(),
            trid_column: default_trid_column(),
            time_window_column: default_time_window_column(),
            address_column: default_address_column(),
        }
    }
}

impl SheetLayout {
    /// Create a layout with the default manifest positions
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the number of leading header rows
    pub fn with_header_rows(mut self, rows: usize) -> Self {
        self.header_rows = rows;
        self
    }

    /// Builder method: set the number of trailing footer rows
    pub fn with_footer_rows(mut self, rows: usize) -> Self {
        self.footer_rows = rows;
        self
    }

    /// Builder method: set the three stop columns (trid, time window, address)
    pub fn with_columns(mut self, trid: usize, time_window: usize, address: usize) -> Self {
        self.trid_column = trid;
        self.time_window_column = time_window;
        self.address_column = address;
        self
    }

    /// Reject layouts where two stop fields read the same column
    pub fn validate(&self) -> Result<()> {
        let cols = [self.trid_column, self.time_window_column, self.address_column];
        if cols[0] == cols[1] || cols[0] == cols[2] || cols[1] == cols[2] {
            return Err(ManifestError::Config(format!(
                "stop columns must be distinct, got trid={} time_window={} address={}",
                self.trid_column, self.time_window_column, self.address_column
            )));
        }
        Ok(())
    }

    /// Range of row indices holding stops, for a sheet with `row_count` rows
    pub fn stop_rows(&self, row_count: usize) -> std::ops::Range<usize> {
        let end = row_count.saturating_sub(self.footer_rows);
        let start = self.header_rows.min(end);
        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let layout = SheetLayout::new();
        assert_eq!(layout.header_rows, 3);
        assert_eq!(layout.footer_rows, 1);
        assert_eq!(
            (layout.trid_column, layout.time_window_column, layout.address_column),
            (1, 4, 5)
        );
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn test_layout_builder() {
        let layout = SheetLayout::new()
            .with_header_rows(2)
            .with_footer_rows(0)
            .with_columns(0, 2, 3);

        assert_eq!(layout.header_rows, 2);
        assert_eq!(layout.footer_rows, 0);
        assert_eq!(layout.stop_rows(5), 2..5);
    }

    #[test]
    fn test_stop_rows() {
        let layout = SheetLayout::new();
        assert_eq!(layout.stop_rows(10), 3..9);
        // Header and footer only
        assert_eq!(layout.stop_rows(4), 3..3);
        // Shorter than the header block
        assert_eq!(layout.stop_rows(2), 1..1);
        assert_eq!(layout.stop_rows(0), 0..0);
    }

    #[test]
    fn test_colliding_columns_rejected() {
        let layout = SheetLayout::new().with_columns(1, 1, 5);
        assert!(matches!(layout.validate(), Err(ManifestError::Config(_))));
    }
}
