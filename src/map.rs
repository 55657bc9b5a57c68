//! Map artifact rendering.
//!
//! Produces one self-contained Leaflet HTML document for a filtered,
//! geolocated event sequence: a numbered circular marker per event with an
//! actor/date/gap popup, and a polyline between consecutive events colored
//! by route tier. The document is returned as an in-memory string; writing
//! it anywhere is the caller's business.

use tracing::debug;

use crate::analyzers::route::RouteSegment;
use crate::record::{Coordinate, Record};

const LEAFLET_CSS: &str = "https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.css";
const LEAFLET_JS: &str = "https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.js";

const TILE_URL: &str =
    "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}";
const TILE_ATTRIBUTION: &str = "Map tiles by Esri, DeLorme, NAVTEQ";

const ZOOM: u8 = 12;
const MARKER_SIZE_PX: u8 = 30;
const LINE_WEIGHT: u8 = 4;
const LINE_OPACITY: f64 = 0.7;

/// Escapes text interpolated into the HTML document.
fn escape_html(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            '\'' => "&#39;".to_string(),
            c => c.to_string(),
        })
        .collect()
}

fn marker_js(
    index: usize,
    coord: Coordinate,
    record: &Record,
    title: &str,
    marker_color: &str,
) -> String {
    let date = record
        .date_part
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());

    let popup = format!(
        "{} {}: {} - {}<br>Elapsed: {:.2} min",
        escape_html(title),
        index,
        escape_html(&record.group_key),
        date,
        record.diff_minutes,
    );

    format!(
        r#"    L.marker([{lat}, {lng}], {{
      icon: L.divIcon({{
        iconSize: [{size}, {size}],
        iconAnchor: [{anchor}, {anchor}],
        html: '<div style="font-size: 12pt; color: white; background-color: {color}; border-radius: 50%; text-align: center; line-height: {size}px;">{index}</div>'
      }})
    }}).bindPopup("{popup}").addTo(map);
"#,
        lat = coord.latitude,
        lng = coord.longitude,
        size = MARKER_SIZE_PX,
        anchor = MARKER_SIZE_PX / 2,
        color = marker_color,
        index = index,
        popup = popup,
    )
}

fn segment_js(segment: &RouteSegment) -> String {
    format!(
        "    L.polyline([[{}, {}], [{}, {}]], {{color: \"{}\", weight: {}, opacity: {}}}).addTo(map);\n",
        segment.from.latitude,
        segment.from.longitude,
        segment.to.latitude,
        segment.to.longitude,
        segment.tier.color(),
        LINE_WEIGHT,
        LINE_OPACITY,
    )
}

/// Renders the map document for an ordered, diffed record sequence.
///
/// Only geolocated records are plotted; the sequence numbers shown on the
/// markers follow the plotted order. Returns `None` when nothing is
/// geolocated, producing no artifact.
pub fn render_map(records: &[Record], title: &str, marker_color: &str) -> Option<String> {
    let located: Vec<&Record> = records.iter().filter(|r| r.coordinate.is_some()).collect();
    if located.is_empty() {
        return None;
    }

    let coords: Vec<_> = located.iter().filter_map(|r| r.coordinate).collect();
    let center_lat = coords.iter().map(|c| c.latitude).sum::<f64>() / coords.len() as f64;
    let center_lng = coords.iter().map(|c| c.longitude).sum::<f64>() / coords.len() as f64;

    let mut body = String::new();
    for (i, (coord, record)) in coords.iter().copied().zip(located.iter().copied()).enumerate() {
        body.push_str(&marker_js(i + 1, coord, record, title, marker_color));
    }

    for pair in coords.windows(2) {
        body.push_str(&segment_js(&RouteSegment::between(pair[0], pair[1])));
    }

    debug!(markers = located.len(), "Map artifact rendered");

    Some(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>{title}</title>
  <link rel="stylesheet" href="{css}" crossorigin="anonymous" referrerpolicy="no-referrer" />
  <script src="{js}" crossorigin="anonymous" referrerpolicy="no-referrer"></script>
  <style>
    html, body {{ margin: 0; height: 100%; }}
    #map {{ height: 100%; }}
  </style>
</head>
<body>
  <div id="map"></div>
  <script>
    var map = L.map("map").setView([{lat}, {lng}], {zoom});
    L.tileLayer("{tiles}", {{ attribution: "{attribution}" }}).addTo(map);
{body}  </script>
</body>
</html>
"#,
        title = escape_html(title),
        css = LEAFLET_CSS,
        js = LEAFLET_JS,
        lat = center_lat,
        lng = center_lng,
        zoom = ZOOM,
        tiles = TILE_URL,
        attribution = TILE_ATTRIBUTION,
        body = body,
    ))
}
