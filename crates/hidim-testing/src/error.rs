//! Error types for hypothesis testing.

use hidim_data::DataError;
use thiserror::Error;

/// Result type for testing operations.
pub type Result<T> = std::result::Result<T, TestingError>;

/// Errors that can occur while testing features or adjusting p-values
#[derive(Debug, Error)]
pub enum TestingError {
    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension
        actual: usize,
    },

    /// A group has too few samples for a variance estimate
    #[error("Group {group} has {actual} replicates, need at least {required}")]
    InsufficientReplicates {
        /// Group label
        group: String,
        /// Required replicates
        required: usize,
        /// Available replicates
        actual: usize,
    },

    /// A p-value is NaN or outside [0, 1]
    #[error("Invalid p-value {value} at position {index}")]
    InvalidPValue {
        /// Position in the input
        index: usize,
        /// Offending value
        value: f64,
    },

    /// No usable variances to estimate a prior from
    #[error("Degenerate variances: {0}")]
    DegenerateVariance(String),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from the data layer
    #[error(transparent)]
    Data(#[from] DataError),
}
