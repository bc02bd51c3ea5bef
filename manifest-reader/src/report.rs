//! Text report generation
//!
//! Four report shapes over the selected routes: summary listings (`info`,
//! `moreinfo`) and per-route stop dumps (`dump`, `dumpschedule`).

use crate::catalog::{Route, RouteCatalog};
use crate::types::{ManifestError, Result, Stop};
use std::fmt;
use std::io::Write;

/// Report shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMode {
    /// Route and stop count
    Info,
    /// Route, stop count, service type and durations
    MoreInfo,
    /// Every stop of every route
    Dump,
    /// Only stops with a delivery window
    DumpSchedule,
}

impl fmt::Display for ReportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportMode::Info => write!(f, "info"),
            ReportMode::MoreInfo => write!(f, "moreinfo"),
            ReportMode::Dump => write!(f, "dump"),
            ReportMode::DumpSchedule => write!(f, "dumpschedule"),
        }
    }
}

/// Output switches for the dump modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    /// Print the `[route]: ...` line and trailing blank line per route
    pub headers: bool,
    /// Append the delivery window (always on for `dumpschedule`)
    pub show_time_window: bool,
    /// Append the quoted address
    pub show_address: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            headers: true,
            show_time_window: false,
            show_address: false,
        }
    }
}

impl ReportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: enable or disable per-route header lines
    pub fn with_headers(mut self, enabled: bool) -> Self {
        self.headers = enabled;
        self
    }

    /// Builder method: enable or disable the time window column
    pub fn with_time_window(mut self, enabled: bool) -> Self {
        self.show_time_window = enabled;
        self
    }

    /// Builder method: enable or disable the address column
    pub fn with_address(mut self, enabled: bool) -> Self {
        self.show_address = enabled;
        self
    }
}

/// Writes reports for a catalog
pub struct ReportWriter<'a> {
    catalog: &'a RouteCatalog,
    options: ReportOptions,
}

impl<'a> ReportWriter<'a> {
    pub fn new(catalog: &'a RouteCatalog, options: ReportOptions) -> Self {
        Self { catalog, options }
    }

    /// Write the report for `targets` in the given order
    ///
    /// Targets missing from the catalog are skipped with a warning.
    pub fn write<W: Write>(&self, out: &mut W, mode: ReportMode, targets: &[String]) -> Result<()> {
        log::debug!("Writing {} report for {} routes", mode, targets.len());
        match mode {
            ReportMode::Info => {
                writeln!(out, "Route, ItemCount")?;
                for route in self.routes(targets) {
                    writeln!(out, "{},{}", route.info.name, route.info.count)?;
                }
            }
            ReportMode::MoreInfo => {
                writeln!(out, "Route, ItemCount, ServiceType, PlanTime, RouteTime")?;
                for route in self.routes(targets) {
                    let info = &route.info;
                    writeln!(
                        out,
                        "{},{},{},{},{}",
                        info.name, info.count, info.servicetype, info.plantime, info.routetime
                    )?;
                }
            }
            ReportMode::Dump => {
                for route in self.routes(targets) {
                    self.write_route(out, route, self.options.show_time_window, |_| true)?;
                }
            }
            ReportMode::DumpSchedule => {
                for route in self.routes(targets) {
                    self.write_route(out, route, true, Stop::has_time_window)?;
                }
            }
        }
        Ok(())
    }

    fn routes<'t>(&'t self, targets: &'t [String]) -> impl Iterator<Item = &'a Route> + 't {
        let catalog = self.catalog;
        targets.iter().filter_map(move |name| {
            let route = catalog.get(name);
            if route.is_none() {
                log::warn!("Route {:?} not in catalog, skipping", name);
            }
            route
        })
    }

    fn write_route<W: Write>(
        &self,
        out: &mut W,
        route: &Route,
        show_time_window: bool,
        keep: impl Fn(&Stop) -> bool,
    ) -> Result<()> {
        if self.options.headers {
            writeln!(
                out,
                "[{}]: ItemCount:{} ServiceType:{}",
                route.info.name, route.info.count, route.info.servicetype
            )?;
        }
        for stop in route.stops.iter().filter(|s| keep(s)) {
            write!(out, "{}", stop.trid)?;
            if show_time_window {
                write!(out, ",{}", stop.time_window)?;
            }
            if self.options.show_address {
                write!(out, ",\"{}\"", stop.address)?;
            }
            writeln!(out)?;
        }
        if self.options.headers {
            writeln!(out)?;
        }
        Ok(())
    }
}

/// Convenience wrapper: write one report into a `String`
pub fn render_report(
    catalog: &RouteCatalog,
    mode: ReportMode,
    targets: &[String],
    options: ReportOptions,
) -> Result<String> {
    let mut buf = Vec::new();
    ReportWriter::new(catalog, options).write(&mut buf, mode, targets)?;
    String::from_utf8(buf)
        .map_err(|e| ManifestError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}
