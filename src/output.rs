//! Output formatting and export for filtered views.
//!
//! Supports pretty-printing, JSON serialization, and CSV export of the
//! table view.

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzers::aggregate::Summary;
use crate::record::Record;
use csv::WriterBuilder;
use std::path::Path;

/// One exported table row. Kept separate from [`Record`] so the CSV shape
/// stays flat and stable.
#[derive(Serialize)]
struct ExportRow<'a> {
    actor: &'a str,
    timestamp: Option<String>,
    date: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    diff_minutes: f64,
}

impl<'a> ExportRow<'a> {
    fn from_record(record: &'a Record) -> Self {
        ExportRow {
            actor: &record.group_key,
            timestamp: record
                .timestamp
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
            date: record.date_part.map(|d| d.format("%Y-%m-%d").to_string()),
            latitude: record.coordinate.map(|c| c.latitude),
            longitude: record.coordinate.map(|c| c.longitude),
            diff_minutes: record.diff_minutes,
        }
    }
}

/// Formats an optional statistic the way the panel displays it.
pub fn display_minutes(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2} min", v),
        None => "N/A".to_string(),
    }
}

/// Logs the view summary: count, mean gap, gap standard deviation.
pub fn print_summary(summary: &Summary) {
    info!(
        count = summary.count,
        mean = %display_minutes(summary.mean_minutes),
        stddev = %display_minutes(summary.stddev_minutes),
        "View summary"
    );
}

/// Logs a filtered view's records using Rust's debug pretty-print format.
pub fn print_pretty(records: &[Record]) {
    debug!("{:#?}", records);
}

/// Logs the summary as pretty-printed JSON.
pub fn print_json(summary: &Summary) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}

/// Writes the filtered table view to a CSV file, headers first.
pub fn export_rows(path: impl AsRef<Path>, records: &[Record]) -> Result<()> {
    let path = path.as_ref();
    debug!(path = %path.display(), rows = records.len(), "Exporting table view");

    let mut writer = WriterBuilder::new().from_path(path)?;

    for record in records {
        writer.serialize(ExportRow::from_record(record))?;
    }
    writer.flush()?;

    Ok(())
}
