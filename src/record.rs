//! Data model: records, datasets, and operator selections.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::analyzers::aggregate::Summary;
use crate::schema::SchemaKind;

/// A validated WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// One input row. Immutable once parsed; `date_part` and `diff_minutes` are
/// derived fields, assigned exactly once by the parser and the diff engine.
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    /// Actor identity: a verifier name or a team name.
    pub group_key: String,
    /// Event timestamp. `None` when the source value did not parse.
    pub timestamp: Option<NaiveDateTime>,
    /// Calendar date of the timestamp, used by the date filter.
    pub date_part: Option<NaiveDate>,
    /// Geolocation, when the row carried a parseable one.
    pub coordinate: Option<Coordinate>,
    /// The raw free-text location field, kept for the table view.
    pub raw_location: Option<String>,
    /// Elapsed minutes since the previous same-group record.
    pub diff_minutes: f64,
}

impl Record {
    pub fn new(group_key: String, timestamp: Option<NaiveDateTime>) -> Self {
        Record {
            group_key,
            date_part: timestamp.map(|t| t.date()),
            timestamp,
            coordinate: None,
            raw_location: None,
            diff_minutes: 0.0,
        }
    }
}

/// An ordered sequence of records sharing one detected schema. Read-only
/// after parse; filtering produces views, never mutates the dataset.
#[derive(Debug)]
pub struct Dataset {
    pub schema: SchemaKind,
    pub records: Vec<Record>,
}

impl Dataset {
    /// Distinct actor identities, sorted. The domain of the actor selector.
    pub fn group_keys(&self) -> Vec<String> {
        let keys: BTreeSet<&str> = self
            .records
            .iter()
            .map(|r| r.group_key.as_str())
            .filter(|k| !k.is_empty())
            .collect();
        keys.into_iter().map(String::from).collect()
    }

    /// Distinct dates on which the given actor has events, sorted. The
    /// domain of the date selector.
    pub fn dates_for(&self, group_key: &str) -> Vec<NaiveDate> {
        let dates: BTreeSet<NaiveDate> = self
            .records
            .iter()
            .filter(|r| r.group_key == group_key)
            .filter_map(|r| r.date_part)
            .collect();
        dates.into_iter().collect()
    }
}

/// An operator's filter choice. Defines a view over a dataset.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// The actor to restrict to.
    pub group_key: String,
    /// Dates to keep. Empty means no date restriction.
    pub dates: BTreeSet<NaiveDate>,
    /// Inclusive bounds, in minutes, applied to computed diffs.
    pub diff_range: Option<(f64, f64)>,
}

/// The result of recomputing a view: filtered, sorted, diffed records plus
/// their aggregates. Rebuilt on every interaction, never cached.
#[derive(Debug, Serialize)]
pub struct ViewModel {
    pub records: Vec<Record>,
    pub summary: Summary,
}

impl ViewModel {
    /// The geolocated subsequence, in view order. This is what the map
    /// renderer plots; the table view keeps all rows.
    pub fn geolocated(&self) -> Vec<Record> {
        self.records
            .iter()
            .filter(|r| r.coordinate.is_some())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rec(group: &str, ts: Option<&str>) -> Record {
        let timestamp =
            ts.map(|t| NaiveDateTime::parse_from_str(t, "%Y-%m-%d %H:%M:%S").unwrap());
        Record::new(group.to_string(), timestamp)
    }

    #[test]
    fn test_group_keys_sorted_distinct() {
        let dataset = Dataset {
            schema: SchemaKind::Responses,
            records: vec![
                rec("Bruno", Some("2024-03-01 08:00:00")),
                rec("Alice", Some("2024-03-01 09:00:00")),
                rec("Alice", Some("2024-03-02 09:00:00")),
            ],
        };
        assert_eq!(dataset.group_keys(), vec!["Alice", "Bruno"]);
    }

    #[test]
    fn test_group_keys_skips_empty() {
        let dataset = Dataset {
            schema: SchemaKind::Responses,
            records: vec![rec("", Some("2024-03-01 08:00:00")), rec("Alice", None)],
        };
        assert_eq!(dataset.group_keys(), vec!["Alice"]);
    }

    #[test]
    fn test_dates_for_actor() {
        let dataset = Dataset {
            schema: SchemaKind::Responses,
            records: vec![
                rec("Alice", Some("2024-03-02 08:00:00")),
                rec("Alice", Some("2024-03-01 08:00:00")),
                rec("Alice", Some("2024-03-01 12:00:00")),
                rec("Alice", None),
                rec("Bruno", Some("2024-03-05 08:00:00")),
            ],
        };
        assert_eq!(
            dataset.dates_for("Alice"),
            vec![
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            ]
        );
    }

    #[test]
    fn test_date_part_derived_from_timestamp() {
        let r = rec("Alice", Some("2024-03-01 23:59:59"));
        assert_eq!(r.date_part, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(rec("Alice", None).date_part, None);
    }
}
