//! Route-segment distance classification.
//!
//! Consecutive geolocated events are connected on the map; the segment color
//! encodes how far apart the two points are on the ellipsoid.

use geo::{Distance, Geodesic, Point};
use serde::Serialize;

use crate::record::{Coordinate, Record};

/// Distance tier of a route segment, from tightest to loosest.
///
/// | Distance          | Tier     | Color      |
/// |-------------------|----------|------------|
/// | < 10 m            | Tight    | darkgreen  |
/// | 10 m to < 30 m    | Moderate | darkorange |
/// | >= 30 m           | Loose    | darkred    |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tier {
    Tight,
    Moderate,
    Loose,
}

impl Tier {
    pub fn classify(meters: f64) -> Tier {
        match meters {
            m if m < 10.0 => Tier::Tight,
            m if m < 30.0 => Tier::Moderate,
            _ => Tier::Loose,
        }
    }

    /// The polyline color the map renderer uses for this tier.
    pub fn color(&self) -> &'static str {
        match self {
            Tier::Tight => "darkgreen",
            Tier::Moderate => "darkorange",
            Tier::Loose => "darkred",
        }
    }
}

/// Ellipsoidal geodesic distance between two points, in meters.
pub fn geodesic_meters(from: &Coordinate, to: &Coordinate) -> f64 {
    let from = Point::new(from.longitude, from.latitude);
    let to = Point::new(to.longitude, to.latitude);
    Geodesic::distance(from, to)
}

/// A classified connection between two consecutive geolocated events.
/// Ephemeral: rebuilt on every interaction, never persisted.
#[derive(Debug, Clone, Copy)]
pub struct RouteSegment {
    pub from: Coordinate,
    pub to: Coordinate,
    pub meters: f64,
    pub tier: Tier,
}

impl RouteSegment {
    pub fn between(from: Coordinate, to: Coordinate) -> RouteSegment {
        let meters = geodesic_meters(&from, &to);
        RouteSegment {
            from,
            to,
            meters,
            tier: Tier::classify(meters),
        }
    }
}

/// Builds the segments connecting consecutive geolocated records, in view
/// order. Records without coordinates take no part in any segment.
pub fn segments(records: &[Record]) -> Vec<RouteSegment> {
    let coords: Vec<Coordinate> = records.iter().filter_map(|r| r.coordinate).collect();

    coords
        .windows(2)
        .map(|pair| RouteSegment::between(pair[0], pair[1]))
        .collect()
}
