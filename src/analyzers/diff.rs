//! Inter-event time gaps.
//!
//! Given records sorted ascending by (group key, timestamp), assigns each
//! record the elapsed minutes since the previous record of the same group.
//! Sorting is a caller precondition; the engine does not re-verify it.

use chrono::NaiveDateTime;

use crate::record::Record;

/// Gaps below this are sub-second jitter and treated as simultaneous.
pub const SNAP_EPSILON_MINUTES: f64 = 0.01;

/// Snaps near-zero noise to exactly zero. Idempotent.
pub fn snap(diff_minutes: f64) -> f64 {
    if diff_minutes < SNAP_EPSILON_MINUTES {
        0.0
    } else {
        diff_minutes
    }
}

fn minutes_between(prev: Option<NaiveDateTime>, current: Option<NaiveDateTime>) -> f64 {
    match (prev, current) {
        // Missing timestamps on either end diff as zero
        (Some(prev), Some(current)) => (current - prev).num_milliseconds() as f64 / 60_000.0,
        _ => 0.0,
    }
}

/// Assigns `diff_minutes` to every record in place. The first record of each
/// group block gets 0.
pub fn compute_diffs(records: &mut [Record]) {
    for i in 0..records.len() {
        let diff = if i == 0 || records[i - 1].group_key != records[i].group_key {
            0.0
        } else {
            minutes_between(records[i - 1].timestamp, records[i].timestamp)
        };
        records[i].diff_minutes = snap(diff);
    }
}
