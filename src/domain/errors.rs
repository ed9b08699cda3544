//! Domain error types
//!
//! This module defines the error hierarchy for the loader. Record-shape problems
//! and storage rejections are local to one input file; only a connection failure
//! is fatal to the whole run. None of the variants expose third-party types.

use thiserror::Error;

/// Main loader error type
///
/// This is the primary error type used throughout the application.
/// It wraps the record and storage error types and provides the
/// fatal/non-fatal distinction used by the directory driver.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The database could not be reached
    #[error("Connection error: {0}")]
    Connection(String),

    /// Errors in the shape or content of an input document
    #[error(transparent)]
    Record(#[from] RecordError),

    /// Errors reported by the storage engine
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl LoaderError {
    /// Returns true when the error must abort the whole run
    ///
    /// Everything except a connection failure is caught at the per-file
    /// boundary and only skips the offending file.
    pub fn is_fatal(&self) -> bool {
        matches!(self, LoaderError::Connection(_))
    }
}

/// Errors in an input document
#[derive(Debug, Error)]
pub enum RecordError {
    /// File content is not valid JSON
    #[error("Invalid JSON: {0}")]
    Parse(String),

    /// Top-level value is neither an object nor an array
    #[error("File {file} does not contain a JSON object or array")]
    UnsupportedShape { file: String },

    /// A required key is absent (or null)
    #[error("Missing required field '{field}' in {entity}")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },

    /// A key holds a value of the wrong JSON type
    #[error("Field '{field}' in {entity} must be {expected}")]
    InvalidField {
        entity: &'static str,
        field: &'static str,
        expected: &'static str,
    },

    /// Visit date is not a `YYYY-MM-DD` calendar date
    #[error("Invalid visit date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },
}

/// Storage-specific errors
///
/// Errors raised by the relational store while writing rows.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A referenced parent row does not exist
    #[error("Foreign key violation: {0}")]
    ForeignKey(String),

    /// Any other integrity constraint rejected the row
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Statement failed for a reason other than a constraint
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Begin, commit or rollback failed
    #[error("Transaction failed: {0}")]
    Transaction(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for LoaderError {
    fn from(err: std::io::Error) -> Self {
        LoaderError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for LoaderError {
    fn from(err: serde_json::Error) -> Self {
        LoaderError::Record(RecordError::Parse(err.to_string()))
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for LoaderError {
    fn from(err: toml::de::Error) -> Self {
        LoaderError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_error_display() {
        let err = LoaderError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_missing_field_names_entity_and_field() {
        let err = RecordError::MissingField {
            entity: "diagnosis",
            field: "code",
        };
        assert_eq!(
            err.to_string(),
            "Missing required field 'code' in diagnosis"
        );
    }

    #[test]
    fn test_record_error_is_transparent() {
        let err: LoaderError = RecordError::InvalidDate {
            value: "10-05-2023".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Invalid visit date '10-05-2023': expected YYYY-MM-DD"
        );
    }

    #[test]
    fn test_storage_error_conversion() {
        let err: LoaderError = StorageError::ForeignKey("visit V9".to_string()).into();
        assert!(matches!(err, LoaderError::Storage(StorageError::ForeignKey(_))));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_only_connection_is_fatal() {
        assert!(LoaderError::Connection("refused".to_string()).is_fatal());
        assert!(!LoaderError::Io("denied".to_string()).is_fatal());
        assert!(!LoaderError::Record(RecordError::Parse("eof".to_string())).is_fatal());
    }

    #[test]
    fn test_serde_json_error_becomes_parse_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: LoaderError = json_err.into();
        assert!(matches!(err, LoaderError::Record(RecordError::Parse(_))));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: LoaderError = io_err.into();
        assert!(matches!(err, LoaderError::Io(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: LoaderError = toml_err.into();
        assert!(matches!(err, LoaderError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }
}
