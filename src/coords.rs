//! Coordinate extraction from raw spreadsheet cells.
//!
//! Two variants exist, matching the two input shapes: a free-text field
//! carrying an `EPSG:4326: <lon> <lat>` pair, and direct latitude/longitude
//! cells that may use a decimal comma. All failures yield `None`; nothing
//! propagates across this boundary.

use regex::Regex;
use std::sync::LazyLock;

use crate::record::Coordinate;

/// The exporter embeds coordinates as `EPSG:4326: <lon> <lat>`.
static EPSG_4326: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"EPSG:4326:\s*(-?\d+\.\d+)\s*(-?\d+\.\d+)").unwrap());

/// Extracts a coordinate from a free-text location field. The first captured
/// number is the longitude, the second the latitude.
pub fn parse_embedded(raw: &str) -> Option<Coordinate> {
    let caps = EPSG_4326.captures(raw)?;
    let longitude: f64 = caps.get(1)?.as_str().parse().ok()?;
    let latitude: f64 = caps.get(2)?.as_str().parse().ok()?;
    Some(Coordinate {
        latitude,
        longitude,
    })
}

/// Parses a numeric cell, accepting a comma as the decimal separator.
pub fn parse_flexible_f64(raw: &str) -> Option<f64> {
    raw.trim().replace(',', ".").parse().ok()
}

/// Builds a coordinate from direct latitude/longitude cells. Either cell
/// failing to parse excludes the row from mapping.
pub fn parse_direct(latitude: &str, longitude: &str) -> Option<Coordinate> {
    Some(Coordinate {
        latitude: parse_flexible_f64(latitude)?,
        longitude: parse_flexible_f64(longitude)?,
    })
}
