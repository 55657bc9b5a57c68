//! View recomputation.
//!
//! Every operator interaction maps to one call of [`render_view`]: a pure
//! function from the immutable dataset and the current selection to the
//! filtered, sorted, diffed, aggregated view. There is no hidden state.

use tracing::debug;

use crate::analyzers::aggregate::summarize;
use crate::analyzers::diff::compute_diffs;
use crate::record::{Dataset, Record, Selection, ViewModel};

/// Recomputes the view for a selection.
///
/// Filters to the selected actor and dates, sorts ascending by timestamp
/// (records with unparseable timestamps sort first), computes gap minutes,
/// then applies the optional inclusive gap-range filter to the diffed rows.
pub fn render_view(dataset: &Dataset, selection: &Selection) -> ViewModel {
    let mut records: Vec<Record> = dataset
        .records
        .iter()
        .filter(|r| r.group_key == selection.group_key)
        .filter(|r| {
            selection.dates.is_empty()
                || r.date_part.is_some_and(|d| selection.dates.contains(&d))
        })
        .cloned()
        .collect();

    records.sort_by_key(|r| r.timestamp);
    compute_diffs(&mut records);

    if let Some((min, max)) = selection.diff_range {
        records.retain(|r| r.diff_minutes >= min && r.diff_minutes <= max);
    }

    let summary = summarize(&records);

    debug!(
        group = %selection.group_key,
        rows = records.len(),
        "View recomputed"
    );

    ViewModel { records, summary }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Coordinate;
    use crate::schema::SchemaKind;
    use chrono::{NaiveDate, NaiveDateTime};
    use std::collections::BTreeSet;

    fn rec(group: &str, ts: Option<&str>) -> Record {
        let timestamp =
            ts.map(|t| NaiveDateTime::parse_from_str(t, "%Y-%m-%d %H:%M:%S").unwrap());
        Record::new(group.to_string(), timestamp)
    }

    fn dataset(records: Vec<Record>) -> Dataset {
        Dataset {
            schema: SchemaKind::Responses,
            records,
        }
    }

    fn select(group: &str) -> Selection {
        Selection {
            group_key: group.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_filters_to_selected_actor() {
        let ds = dataset(vec![
            rec("Alice", Some("2024-03-01 08:00:00")),
            rec("Bruno", Some("2024-03-01 08:01:00")),
            rec("Alice", Some("2024-03-01 08:05:00")),
        ]);

        let view = render_view(&ds, &select("Alice"));
        assert_eq!(view.records.len(), 2);
        assert!(view.records.iter().all(|r| r.group_key == "Alice"));
    }

    #[test]
    fn test_sorts_and_diffs_unordered_input() {
        let ds = dataset(vec![
            rec("Alice", Some("2024-03-01 08:05:00")),
            rec("Alice", Some("2024-03-01 08:00:00")),
        ]);

        let view = render_view(&ds, &select("Alice"));
        let diffs: Vec<f64> = view.records.iter().map(|r| r.diff_minutes).collect();
        assert_eq!(diffs, vec![0.0, 5.0]);
    }

    #[test]
    fn test_missing_timestamps_sort_first() {
        let ds = dataset(vec![
            rec("Alice", Some("2024-03-01 08:00:00")),
            rec("Alice", None),
        ]);

        let view = render_view(&ds, &select("Alice"));
        assert!(view.records[0].timestamp.is_none());
        assert!(view.records[1].timestamp.is_some());
        // Both diff zero: the unparseable row contributes no gap
        assert!(view.records.iter().all(|r| r.diff_minutes == 0.0));
    }

    #[test]
    fn test_date_filter() {
        let ds = dataset(vec![
            rec("Alice", Some("2024-03-01 08:00:00")),
            rec("Alice", Some("2024-03-02 08:00:00")),
            rec("Alice", None),
        ]);

        let mut selection = select("Alice");
        selection.dates = BTreeSet::from([NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()]);

        let view = render_view(&ds, &selection);
        assert_eq!(view.records.len(), 1);
        assert_eq!(
            view.records[0].date_part,
            NaiveDate::from_ymd_opt(2024, 3, 2)
        );
    }

    #[test]
    fn test_empty_date_set_keeps_all_rows() {
        let ds = dataset(vec![
            rec("Alice", Some("2024-03-01 08:00:00")),
            rec("Alice", None),
        ]);

        let view = render_view(&ds, &select("Alice"));
        assert_eq!(view.records.len(), 2);
    }

    #[test]
    fn test_diff_range_filters_after_diffing() {
        let ds = dataset(vec![
            rec("Alice", Some("2024-03-01 08:00:00")),
            rec("Alice", Some("2024-03-01 08:05:00")),
            rec("Alice", Some("2024-03-01 09:30:00")),
        ]);

        let mut selection = select("Alice");
        selection.diff_range = Some((0.0, 60.0));

        let view = render_view(&ds, &selection);
        // The 85-minute gap is filtered out; the bounds are inclusive
        let diffs: Vec<f64> = view.records.iter().map(|r| r.diff_minutes).collect();
        assert_eq!(diffs, vec![0.0, 5.0]);
    }

    #[test]
    fn test_empty_view_summary_is_undefined() {
        let ds = dataset(vec![rec("Alice", Some("2024-03-01 08:00:00"))]);
        let view = render_view(&ds, &select("Cora"));
        assert_eq!(view.summary.count, 0);
        assert_eq!(view.summary.mean_minutes, None);
        assert_eq!(view.summary.stddev_minutes, None);
    }

    #[test]
    fn test_recomputation_is_pure() {
        let ds = dataset(vec![
            rec("Alice", Some("2024-03-01 08:00:00")),
            rec("Alice", Some("2024-03-01 08:05:00")),
        ]);
        let selection = select("Alice");

        let first = render_view(&ds, &selection);
        let second = render_view(&ds, &selection);
        assert_eq!(first.summary, second.summary);
        assert_eq!(first.records.len(), second.records.len());
    }

    #[test]
    fn test_geolocated_subsequence() {
        let mut located = rec("Alice", Some("2024-03-01 08:00:00"));
        located.coordinate = Some(Coordinate {
            latitude: -23.5505,
            longitude: -46.6333,
        });
        let ds = dataset(vec![located, rec("Alice", Some("2024-03-01 08:05:00"))]);

        let view = render_view(&ds, &select("Alice"));
        assert_eq!(view.records.len(), 2);
        assert_eq!(view.geolocated().len(), 1);
    }
}
