//! Workflow error type.

use hidim_data::DataError;
use hidim_output::{ExportError, ReportError};
use hidim_penalized::PenalizedError;
use hidim_testing::TestingError;
use thiserror::Error;

/// Result type for workflow operations.
pub type Result<T> = std::result::Result<T, WorkflowError>;

/// Errors raised anywhere in a workflow.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Loading or assembling data failed
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Model fitting or cross-validation failed
    #[error("Model error: {0}")]
    Penalized(#[from] PenalizedError),

    /// Per-feature testing failed
    #[error("Testing error: {0}")]
    Testing(#[from] TestingError),

    /// Exporting a table failed
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Building or writing a report failed
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration values are out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
