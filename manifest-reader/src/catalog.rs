//! Route catalog
//!
//! Holds every route loaded from a manifest workbook: its parsed header and
//! its stop table, keyed by route name and kept in sheet order. The catalog
//! is built once by `RouteCatalog::load` and read-only afterwards.

use crate::config::{SheetLayout, HEADER_LEAD_COLUMN, HEADER_TAIL_COLUMN};
use crate::header::parse_route_header;
use crate::types::{ManifestError, Result, RouteInfo, Stop};
use crate::workbook::{Sheet, WorkbookSource, XlsxWorkbook};
use std::collections::HashMap;
use std::path::Path;

/// A route together with its stops
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub info: RouteInfo,
    pub stops: Vec<Stop>,
}

/// All routes of a manifest, in sheet order
#[derive(Debug, Clone, Default)]
pub struct RouteCatalog {
    /// Route names in insertion order
    order: Vec<String>,
    routes: HashMap<String, Route>,
}

impl RouteCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every sheet of an `.xlsx` file
    ///
    /// The file is closed before this returns, whether loading succeeded or not.
    pub fn load_path(path: &Path, layout: &SheetLayout) -> Result<Self> {
        let mut workbook = XlsxWorkbook::open(path)?;
        Self::load(&mut workbook, layout)
    }

    /// Load every sheet of a workbook source
    ///
    /// Fails as a unit: an unparseable header or a duplicate route name in any
    /// sheet aborts the whole load.
    pub fn load<W: WorkbookSource>(source: &mut W, layout: &SheetLayout) -> Result<Self> {
        layout.validate()?;

        let mut catalog = Self::new();
        for sheet_name in source.sheet_names() {
            let sheet = source.read_sheet(&sheet_name)?;
            let (info, stops) = read_route(&sheet, layout)?;
            log::debug!(
                "Loaded route {} from sheet {:?} ({} stops)",
                info.name,
                sheet_name,
                stops.len()
            );
            catalog.insert(&sheet_name, info, stops)?;
        }

        log::info!("Loaded {} routes", catalog.len());
        Ok(catalog)
    }

    /// Add a route, setting its stop count from the stop table
    ///
    /// `sheet` names the origin of the route in the duplicate error.
    pub fn insert(&mut self, sheet: &str, mut info: RouteInfo, stops: Vec<Stop>) -> Result<()> {
        if self.routes.contains_key(&info.name) {
            return Err(ManifestError::DuplicateRoute {
                name: info.name,
                sheet: sheet.to_string(),
            });
        }
        info.count = stops.len();
        self.order.push(info.name.clone());
        self.routes.insert(info.name.clone(), Route { info, stops });
        Ok(())
    }

    /// Number of routes
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.routes.contains_key(name)
    }

    /// Route names in sheet order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Routes in sheet order
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.order.iter().filter_map(move |name| self.routes.get(name))
    }

    pub fn get(&self, name: &str) -> Option<&Route> {
        self.routes.get(name)
    }

    pub fn info(&self, name: &str) -> Option<&RouteInfo> {
        self.routes.get(name).map(|r| &r.info)
    }

    pub fn stops(&self, name: &str) -> Option<&[Stop]> {
        self.routes.get(name).map(|r| r.stops.as_slice())
    }
}

/// Header text of a sheet: cells A1 and E1 joined by one space
pub fn header_text(sheet: &Sheet) -> String {
    format!(
        "{} {}",
        sheet.cell(0, HEADER_LEAD_COLUMN).to_header_text(),
        sheet.cell(0, HEADER_TAIL_COLUMN).to_header_text()
    )
}

/// Parse one route sheet into its header record and stop table
pub fn read_route(sheet: &Sheet, layout: &SheetLayout) -> Result<(RouteInfo, Vec<Stop>)> {
    let info = parse_route_header(sheet.name(), &header_text(sheet))?;

    let stops = layout
        .stop_rows(sheet.row_count())
        .map(|row| Stop {
            trid: sheet.cell(row, layout.trid_column).to_string(),
            time_window: sheet.cell(row, layout.time_window_column).to_string(),
            address: sheet.cell(row, layout.address_column).to_string(),
        })
        .collect();

    Ok((info, stops))
}
