//! CSV parser for validation logs.
//!
//! Detects the input schema from the header row and builds a [`Dataset`].
//! Row-level failures (bad timestamps, bad coordinates) are coerced to
//! missing values, never surfaced; only structural problems error out.

use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::coords;
use crate::record::{Dataset, Record};
use crate::schema::{self, SchemaKind};

/// Accepted timestamp layouts, tried in order. The exporter is not
/// consistent about them across spreadsheets.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

#[derive(Debug, Error)]
pub enum ParseError {
    /// Neither known timestamp column is present. Downstream processing is
    /// skipped entirely; the caller no-ops rather than failing.
    #[error("input columns match no known validation schema")]
    UnknownSchema,
    #[error("failed to read input file")]
    Io(#[from] std::io::Error),
    #[error("malformed tabular input")]
    Csv(#[from] csv::Error),
}

/// Coerces a timestamp cell to a value, or `None` when it does not parse.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Reads one CSV file into a [`Dataset`].
///
/// # Errors
///
/// Returns [`ParseError::UnknownSchema`] when the header matches neither
/// shape, and I/O or CSV errors when the file itself is unreadable.
pub fn parse_dataset(path: impl AsRef<Path>) -> Result<Dataset, ParseError> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;

    let headers = reader.headers()?.clone();
    let header_names: Vec<&str> = headers.iter().collect();
    let schema = SchemaKind::detect(&header_names).ok_or(ParseError::UnknownSchema)?;

    let columns: HashMap<&str, usize> = header_names
        .iter()
        .enumerate()
        .map(|(i, name)| (*name, i))
        .collect();

    let cell = |row: &csv::StringRecord, name: &str| -> Option<String> {
        columns
            .get(name)
            .and_then(|&i| row.get(i))
            .map(|s| s.to_string())
    };

    let mut records = Vec::new();

    for row in reader.records() {
        let row = row?;

        let group_key = cell(&row, schema.actor_column()).unwrap_or_default();
        let timestamp = cell(&row, schema.timestamp_column())
            .as_deref()
            .and_then(parse_timestamp);

        let mut record = Record::new(group_key, timestamp);

        match schema {
            SchemaKind::Responses => {
                record.raw_location = cell(&row, schema::responses::GEO_TEXT);
                record.coordinate = record
                    .raw_location
                    .as_deref()
                    .and_then(coords::parse_embedded);
            }
            SchemaKind::Teams => {
                let lat = cell(&row, schema::teams::LATITUDE);
                let long = cell(&row, schema::teams::LONGITUDE);
                record.coordinate = match (lat, long) {
                    (Some(lat), Some(long)) => coords::parse_direct(&lat, &long),
                    _ => None,
                };
            }
        }

        records.push(record);
    }

    debug!(schema = %schema, rows = records.len(), "Dataset parsed");

    Ok(Dataset { schema, records })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_responses_dataset() {
        let file = write_csv(
            "Carimbo de data/hora,Verificador,Localização Georeferencial\n\
             2024-03-01 08:00:00,Alice,EPSG:4326: -46.6333 -23.5505\n\
             2024-03-01 08:05:00,Alice,sem coordenadas\n",
        );

        let dataset = parse_dataset(file.path()).unwrap();
        assert_eq!(dataset.schema, SchemaKind::Responses);
        assert_eq!(dataset.records.len(), 2);

        let first = &dataset.records[0];
        assert_eq!(first.group_key, "Alice");
        let coord = first.coordinate.unwrap();
        assert_eq!(coord.latitude, -23.5505);
        assert_eq!(coord.longitude, -46.6333);

        // Unparseable coordinate keeps the row, drops the coordinate
        assert!(dataset.records[1].coordinate.is_none());
        assert!(dataset.records[1].timestamp.is_some());
    }

    #[test]
    fn test_parse_teams_dataset_decimal_comma() {
        let file = write_csv(
            "data_hora_validacao,desc_equipe,Latitude,Longitude\n\
             2024-03-01 08:00:00,Equipe Norte,\"-23,5505\",\"-46,6333\"\n\
             2024-03-01 08:10:00,Equipe Norte,,\n",
        );

        let dataset = parse_dataset(file.path()).unwrap();
        assert_eq!(dataset.schema, SchemaKind::Teams);

        let coord = dataset.records[0].coordinate.unwrap();
        assert_eq!(coord.latitude, -23.5505);
        assert_eq!(coord.longitude, -46.6333);
        assert!(dataset.records[1].coordinate.is_none());
    }

    #[test]
    fn test_parse_unknown_schema() {
        let file = write_csv("timestamp,name\n2024-03-01 08:00:00,Alice\n");
        match parse_dataset(file.path()) {
            Err(ParseError::UnknownSchema) => {}
            other => panic!("expected UnknownSchema, got {:?}", other.map(|d| d.schema)),
        }
    }

    #[test]
    fn test_bad_timestamp_coerces_to_none() {
        let file = write_csv(
            "Carimbo de data/hora,Verificador\n\
             nunca,Alice\n\
             2024-03-01 08:00:00,Alice\n",
        );

        let dataset = parse_dataset(file.path()).unwrap();
        assert!(dataset.records[0].timestamp.is_none());
        assert!(dataset.records[0].date_part.is_none());
        assert!(dataset.records[1].timestamp.is_some());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-03-01 08:00:00").is_some());
        assert!(parse_timestamp("2024-03-01 08:00:00.180").is_some());
        assert!(parse_timestamp("2024-03-01T08:00:00").is_some());
        assert!(parse_timestamp("01/03/2024 08:00:00").is_some());
        assert!(parse_timestamp("01/03/2024 08:00").is_some());
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("03-01-2024").is_none());
    }
}
