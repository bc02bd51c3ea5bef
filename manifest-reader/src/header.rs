//! Route header parser
//!
//! Every route sheet starts with a single line of free text describing the
//! route, e.g.
//!
//! ```text
//! Route for AB123   Driving distance: 12.50 km Route plan: 1 hours 30 minutes Route time: 1 hours 45 minutes   Total capacity: 200.00 cu ft   Service type: Standard   Preferred DSP:
//! ```
//!
//! The separators are fixed literals (three spaces before each section except
//! the distance/plan/time run, which uses single spaces).

use crate::types::{ManifestError, Result, RouteInfo};
use once_cell::sync::Lazy;
use regex::Regex;

static HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"\ARoute for (?P<name>[A-Z]+[0-9]+)   ",
        r"Driving distance: (?P<distance>[0-9]+\.[0-9]+) km ",
        r"Route plan: (?P<plantime>[0-9]+ hours [0-9]+ minutes) ",
        r"Route time: (?P<routetime>[0-9]+ hours [0-9]+ minutes)   ",
        r"Total capacity: (?P<capacity>[0-9]+\.[0-9]+) cu ft   ",
        r"Service type: (?P<servicetype>.+?)   ",
        r"Preferred DSP: (?P<dspcode>.*)\z",
    ))
    .expect("route header pattern is valid")
});

/// Parse a sheet header into a `RouteInfo` with `count` left at zero
///
/// `sheet` is only used to label the error when the header does not match.
pub fn parse_route_header(sheet: &str, header: &str) -> Result<RouteInfo> {
    let unparseable = || ManifestError::UnparseableHeader {
        sheet: sheet.to_string(),
        header: header.to_string(),
    };

    let caps = HEADER_RE.captures(header).ok_or_else(unparseable)?;

    let distance: f64 = caps["distance"].parse().map_err(|_| unparseable())?;
    let capacity: f64 = caps["capacity"].parse().map_err(|_| unparseable())?;

    let info = RouteInfo {
        name: caps["name"].to_string(),
        distance,
        plantime: caps["plantime"].to_string(),
        routetime: caps["routetime"].to_string(),
        capacity,
        servicetype: caps["servicetype"].to_string(),
        dspcode: caps["dspcode"].to_string(),
        count: 0,
    };

    log::trace!("Parsed header of sheet {:?}: {:?}", sheet, info);
    Ok(info)
}
