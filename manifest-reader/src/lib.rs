//! Manifest Reader Library
//!
//! Reads delivery-route manifest workbooks (one sheet per route) and turns
//! them into filtered text reports.
//!
//! # Architecture
//!
//! - Each sheet's first row holds a free-text route header, parsed into a
//!   `RouteInfo` by a fixed grammar
//! - The rows below it hold the route's stops
//! - `RouteCatalog` loads every sheet once; selection and reporting only read it
//! - Route lists are inclusion lists with the `all` provider selector and
//!   exclusion lists with a specific provider
//!
//! Argument parsing, config files and logging setup live in the application
//! layer (manifest-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use manifest_reader::{
//!     select, ProviderSelector, ProviderTable, ReportMode, ReportOptions, ReportWriter,
//!     RouteCatalog, SheetLayout,
//! };
//! use std::path::Path;
//!
//! let catalog = RouteCatalog::load_path(Path::new("manifest.xlsx"), &SheetLayout::new()).unwrap();
//! let selection = select(
//!     &catalog,
//!     &ProviderTable::new(),
//!     &ProviderSelector::Named("sbs".into()),
//!     &["AB12"],
//! )
//! .unwrap();
//!
//! let writer = ReportWriter::new(&catalog, ReportOptions::new().with_address(true));
//! writer
//!     .write(&mut std::io::stdout(), ReportMode::DumpSchedule, &selection.targets)
//!     .unwrap();
//! ```

// Public modules
pub mod catalog;
pub mod config;
pub mod header;
pub mod provider;
pub mod report;
pub mod selector;
pub mod types;
pub mod workbook;

// Re-export main types for convenience
pub use catalog::{Route, RouteCatalog};
pub use config::SheetLayout;
pub use header::parse_route_header;
pub use provider::{ProviderSelector, ProviderTable};
pub use report::{render_report, ReportMode, ReportOptions, ReportWriter};
pub use selector::{
    resolve_route_names, select, select_by_exclusion_with_provider, select_by_inclusion,
    Selection,
};
pub use types::{CellValue, ManifestError, Result, RouteInfo, Stop, NO_WINDOW};
pub use workbook::{MemoryWorkbook, Sheet, WorkbookSource, XlsxWorkbook};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
