//! Error types for the data-loader crate.

use thiserror::Error;

/// Errors that can occur during data loading and parsing
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line in data file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Record has the wrong number of `::`-separated fields
    #[error("Expected {expected} fields but found {found} at line {line} in {file}")]
    FieldCountMismatch {
        file: String,
        expected: usize,
        found: usize,
        line: usize,
    },

    /// A like by a reader who is not in users.dat
    #[error("Like of series {series_id} by unknown reader {user_id}")]
    UnknownUser { user_id: String, series_id: u32 },

    /// A like of a series that is not in series.dat
    #[error("Reader {user_id} likes unknown series {series_id}")]
    UnknownSeries { user_id: String, series_id: u32 },

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
