//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while loading or assembling data.
#[derive(Debug, Error)]
pub enum DataError {
    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A requested column does not exist
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// A column could not be interpreted as numeric
    #[error("Column {column} is not numeric: {reason}")]
    NonNumeric {
        /// Offending column
        column: String,
        /// Why it was rejected
        reason: String,
    },

    /// Shapes of the supplied pieces do not agree
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Dataset has no rows or no usable columns
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}
