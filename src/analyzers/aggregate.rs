//! Summary statistics over a filtered view.

use serde::Serialize;

use crate::analyzers::utility::{mean, sample_stddev};
use crate::record::Record;

/// Count, mean, and sample standard deviation of a view's gap minutes.
/// Mean is undefined for an empty view, the standard deviation below two
/// records; callers display those as `N/A`.
#[derive(Debug, Serialize, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean_minutes: Option<f64>,
    pub stddev_minutes: Option<f64>,
}

/// Aggregates the gap minutes of a filtered, diffed view.
pub fn summarize(records: &[Record]) -> Summary {
    let diffs: Vec<f64> = records.iter().map(|r| r.diff_minutes).collect();

    let mean_minutes = if diffs.is_empty() {
        None
    } else {
        Some(mean(&diffs))
    };
    let stddev_minutes = mean_minutes.and_then(|m| sample_stddev(&diffs, m));

    Summary {
        count: diffs.len(),
        mean_minutes,
        stddev_minutes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    fn rec_with_diff(diff: f64) -> Record {
        let mut r = Record::new("Alice".to_string(), None);
        r.diff_minutes = diff;
        r
    }

    #[test]
    fn test_empty_view_is_undefined() {
        let summary = summarize(&[]);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.mean_minutes, None);
        assert_eq!(summary.stddev_minutes, None);
    }

    #[test]
    fn test_single_record_mean_defined_stddev_not() {
        let summary = summarize(&[rec_with_diff(0.0)]);
        assert_eq!(summary.count, 1);
        assert_eq!(summary.mean_minutes, Some(0.0));
        assert_eq!(summary.stddev_minutes, None);
    }

    #[test]
    fn test_mean_and_stddev() {
        let records: Vec<Record> = [0.0, 5.0, 10.0].into_iter().map(rec_with_diff).collect();
        let summary = summarize(&records);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.mean_minutes, Some(5.0));
        assert_eq!(summary.stddev_minutes, Some(5.0));
    }
}
