//! Core types for the manifest reader library
//!
//! This module defines the records produced when a manifest workbook is loaded:
//! one `RouteInfo` per route sheet and an ordered list of `Stop` rows.

use std::fmt;
use std::path::PathBuf;

/// Result type for manifest operations
pub type Result<T> = std::result::Result<T, ManifestError>;

/// Text stored in the time window column when a stop has no delivery window
pub const NO_WINDOW: &str = "nan";

/// Route metadata parsed from a sheet header
#[derive(Debug, Clone, PartialEq)]
pub struct RouteInfo {
    /// Route identifier (e.g. "AB123")
    pub name: String,
    /// Total driving distance in km
    pub distance: f64,
    /// Planned duration, "N hours M minutes"
    pub plantime: String,
    /// Allotted route duration, same format as `plantime`
    pub routetime: String,
    /// Total capacity in cubic feet
    pub capacity: f64,
    /// Service classification label
    pub servicetype: String,
    /// Preferred DSP code; empty when the route has no preferred provider
    pub dspcode: String,
    /// Number of stops, set by the catalog once the stop table is loaded
    pub count: usize,
}

/// One row of a route's stop table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stop {
    /// Stop/tracking identifier
    pub trid: String,
    /// Delivery window text, or `NO_WINDOW`
    pub time_window: String,
    /// Delivery address
    pub address: String,
}

impl Stop {
    /// True if the stop carries a delivery window
    pub fn has_time_window(&self) -> bool {
        self.time_window != NO_WINDOW
    }
}

/// Errors that can occur while loading, selecting or reporting
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Input file not found: {0:?}")]
    InputNotFound(PathBuf),

    #[error("Failed to read workbook: {0}")]
    Workbook(String),

    #[error("Failed to read workbook archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Failed to parse workbook XML: {0}")]
    Xml(String),

    #[error("Unparseable route header in sheet {sheet:?}: {header:?}")]
    UnparseableHeader { sheet: String, header: String },

    #[error("Duplicate route {name:?} in sheet {sheet:?}")]
    DuplicateRoute { name: String, sheet: String },

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single worksheet cell value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Error code such as `#N/A`
    Error(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Render the cell for the header line, where an empty cell is empty text
    pub fn to_header_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => write!(f, "{}", NO_WINDOW),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => {
                write!(f, "{}", *v as i64)
            }
            CellValue::Number(v) => write!(f, "{}", v),
            CellValue::Bool(v) => write!(f, "{}", if *v { "True" } else { "False" }),
            CellValue::Error(code) => write!(f, "{}", code),
        }
    }
}
