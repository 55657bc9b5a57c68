//! Column-name constants and schema detection for validation logs.
//!
//! The upstream exporter produces two spreadsheet shapes, distinguished by
//! their timestamp column. Column headers are the exporter's own (Portuguese)
//! names and are kept verbatim as the single source of truth.

/// Columns of the per-verifier responses export.
pub mod responses {
    pub const TIMESTAMP: &str = "Carimbo de data/hora";
    pub const ACTOR: &str = "Verificador";
    pub const GEO_TEXT: &str = "Localização Georeferencial";
}

/// Columns of the per-team validations export.
pub mod teams {
    pub const TIMESTAMP: &str = "data_hora_validacao";
    pub const ACTOR: &str = "desc_equipe";
    pub const LATITUDE: &str = "Latitude";
    pub const LONGITUDE: &str = "Longitude";
}

/// The two known record shapes an input table can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    /// Individual verifier responses, with coordinates embedded in free text.
    Responses,
    /// Team validations, with direct latitude/longitude columns.
    Teams,
}

impl SchemaKind {
    /// Classifies a header row by its timestamp column. Returns `None` when
    /// neither known timestamp column is present; callers must then skip all
    /// downstream processing.
    pub fn detect<S: AsRef<str>>(headers: &[S]) -> Option<SchemaKind> {
        let has = |name: &str| headers.iter().any(|h| h.as_ref() == name);

        if has(responses::TIMESTAMP) {
            Some(SchemaKind::Responses)
        } else if has(teams::TIMESTAMP) {
            Some(SchemaKind::Teams)
        } else {
            None
        }
    }

    /// The timestamp column for this shape.
    pub fn timestamp_column(&self) -> &'static str {
        match self {
            SchemaKind::Responses => responses::TIMESTAMP,
            SchemaKind::Teams => teams::TIMESTAMP,
        }
    }

    /// The actor-identity column for this shape.
    pub fn actor_column(&self) -> &'static str {
        match self {
            SchemaKind::Responses => responses::ACTOR,
            SchemaKind::Teams => teams::ACTOR,
        }
    }
}

impl std::fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaKind::Responses => write!(f, "responses"),
            SchemaKind::Teams => write!(f, "teams"),
        }
    }
}
