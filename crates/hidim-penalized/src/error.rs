//! Error types for model fitting and selection.

use thiserror::Error;

/// Result type for fitting operations.
pub type Result<T> = std::result::Result<T, PenalizedError>;

/// Errors that can occur while fitting or selecting a model
#[derive(Debug, Error)]
pub enum PenalizedError {
    /// The cross-product matrix is singular or numerically close to it
    #[error("Design is rank deficient: {features} columns, numerical rank below that ({reason})")]
    RankDeficient {
        /// Number of columns in the system
        features: usize,
        /// Where the deficiency was detected
        reason: String,
    },

    /// An iterative solver stopped before meeting its tolerance
    #[error("Solver did not converge at lambda = {lambda} after {iterations} iterations")]
    NotConverged {
        /// Penalty strength being fitted
        lambda: f64,
        /// Iterations performed
        iterations: usize,
    },

    /// Insufficient data for estimation
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations
        required: usize,
        /// Actual number of observations
        actual: usize,
    },

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension
        actual: usize,
    },

    /// Response has no variation, so no penalty path can be built
    #[error("Response has zero variance")]
    DegenerateResponse,

    /// Penalty path violates its ordering or positivity requirements
    #[error("Invalid penalty path: {0}")]
    InvalidPath(String),

    /// Every cross-validation fold was excluded
    #[error("No cross-validation fold produced a finite error")]
    NoValidFolds,

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}
