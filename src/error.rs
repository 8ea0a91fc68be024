use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while resolving, reading or summarising trip data.
///
/// Empty record sets and missing optional columns are not errors; they show
/// up as sentinel values in the rendered bundle instead.
#[derive(Error, Debug)]
pub enum BikeshareError {
    /// The city is not one of the supported sources.
    #[error("Unknown city: {0}")]
    UnknownCity(String),

    /// A month or day selection outside the fixed vocabulary.
    #[error("Invalid {kind} filter: {value}")]
    InvalidFilter { kind: &'static str, value: String },

    /// A `Start Time` cell could not be parsed. The whole load is rejected.
    #[error("Malformed timestamp on line {line}: {value:?}")]
    MalformedTimestamp { line: u64, value: String },

    /// A numeric cell could not be parsed.
    #[error("Malformed {column} on line {line}: {value:?}")]
    MalformedField {
        column: &'static str,
        line: u64,
        value: String,
    },

    /// A required column is absent from the source header.
    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),

    /// The backing file could not be opened.
    #[error("Failed to read source {path}: {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A statistics task panicked or was cancelled.
    #[error("Statistics task failed: {0}")]
    TaskJoin(String),
}

pub type Result<T> = std::result::Result<T, BikeshareError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_unknown_city() {
        let err = BikeshareError::UnknownCity("Boston".to_string());
        assert_eq!(err.to_string(), "Unknown city: Boston");
    }

    #[test]
    fn test_error_display_invalid_filter() {
        let err = BikeshareError::InvalidFilter {
            kind: "month",
            value: "July".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid month filter: July");
    }

    #[test]
    fn test_error_display_malformed_timestamp() {
        let err = BikeshareError::MalformedTimestamp {
            line: 4,
            value: "yesterday".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed timestamp on line 4: \"yesterday\""
        );
    }

    #[test]
    fn test_error_display_source_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = BikeshareError::SourceRead {
            path: PathBuf::from("static/chicago.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("static/chicago.csv"));
        assert!(msg.contains("no such file"));
    }
}
