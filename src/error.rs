//! Error types for the expense tracker
//!
//! Every failure the reporting core can produce is recoverable by the user:
//! a date phrase that could not be understood, a range given backwards, or a
//! category id that does not exist. Infrastructure failures (I/O, JSON,
//! export) share the same enum so callers only handle one type.

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for expense tracker operations
#[derive(Error, Debug)]
pub enum TrackerError {
    /// The text matched none of the recognised date grammars
    #[error("Could not understand date expression: '{input}'")]
    DateParse { input: String },

    /// An explicit range whose start is after its end
    #[error("Invalid range: {start} is after {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// A report or transaction referenced a category that does not exist
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Category still referenced by transactions
    #[error("Category '{name}' is used by {count} transaction(s) and cannot be deleted")]
    CategoryInUse { name: String, count: usize },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),
}

impl TrackerError {
    /// Create a date parse error echoing the offending text
    pub fn date_parse(input: impl Into<String>) -> Self {
        Self::DateParse {
            input: input.into(),
        }
    }

    /// Create a "not found" error for transactions
    pub fn transaction_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Transaction",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error of any kind
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::CategoryNotFound(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Whether the error came from interpreting user-supplied dates
    pub fn is_date_error(&self) -> bool {
        matches!(self, Self::DateParse { .. } | Self::InvalidRange { .. })
    }
}

impl From<std::io::Error> for TrackerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for expense tracker operations
pub type TrackerResult<T> = Result<T, TrackerError>;
