//! Error types for vehicle-telemetry.
//!
//! This module defines all error types used throughout the crate, providing
//! the offending parameter, path or line so failures can be acted on directly.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for vehicle-telemetry operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Generation Errors ===
    /// A generation parameter is out of range.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// Description of what is wrong with it.
        message: String,
    },

    // === Dataset Errors ===
    /// The dataset could not be written.
    #[error("failed to write dataset to {path}: {source}")]
    Write {
        /// Destination path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The dataset could not be opened for reading.
    #[error("failed to read dataset at {path}: {source}")]
    Read {
        /// Path of the dataset.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The dataset header does not match the telemetry schema.
    #[error("dataset schema mismatch: expected columns [{expected}], found [{found}]")]
    SchemaMismatch {
        /// The expected header, comma separated.
        expected: String,
        /// The header actually found, comma separated.
        found: String,
    },

    /// A single row failed validation.
    #[error("malformed record at line {line}: {reason}")]
    MalformedRecord {
        /// 1-based data line of the row (header excluded).
        line: u64,
        /// Why the row was rejected.
        reason: String,
    },

    /// CSV encoding or decoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },
}

/// A specialized Result type for vehicle-telemetry operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an invalid parameter error.
    #[must_use]
    pub fn invalid_parameter(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            message: message.into(),
        }
    }

    /// Create a malformed record error.
    #[must_use]
    pub fn malformed(line: u64, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            line,
            reason: reason.into(),
        }
    }

    /// Create a write error for the given destination.
    #[must_use]
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Check if this error is an invalid generation parameter.
    #[must_use]
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, Self::InvalidParameter { .. })
    }

    /// Check if this error is a dataset write failure.
    #[must_use]
    pub fn is_write_error(&self) -> bool {
        matches!(self, Self::Write { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter_display() {
        let err = Error::invalid_parameter("weeks", "must be greater than 0");
        assert_eq!(
            err.to_string(),
            "invalid parameter 'weeks': must be greater than 0"
        );
        assert!(err.is_invalid_parameter());
        assert!(!err.is_write_error());
    }

    #[test]
    fn test_write_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::write("/root/forbidden/data.csv", io_err);
        let msg = err.to_string();
        assert!(msg.contains("/root/forbidden/data.csv"));
        assert!(msg.contains("access denied"));
        assert!(err.is_write_error());
    }

    #[test]
    fn test_malformed_record_display() {
        let err = Error::malformed(42, "throttle_pct 150 outside [0, 100]");
        let msg = err.to_string();
        assert!(msg.contains("line 42"));
        assert!(msg.contains("throttle_pct"));
    }

    #[test]
    fn test_schema_mismatch_display() {
        let err = Error::SchemaMismatch {
            expected: "timestamp,speed_kmh".to_string(),
            found: "timestamp".to_string(),
        };
        assert!(err.to_string().contains("expected columns [timestamp,speed_kmh]"));
    }

    #[test]
    fn test_read_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = Error::Read {
            path: PathBuf::from("data/missing.csv"),
            source: io_err,
        };
        assert!(err.to_string().contains("data/missing.csv"));
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "interval_secs must be greater than 0".to_string(),
        };
        assert!(err.to_string().contains("interval_secs"));
    }
}
