//! End-to-end analysis workflows.
//!
//! Each workflow takes loaded data, runs the numerical pipeline and returns
//! an outcome holding both the raw results and the presentation tables.

pub mod config;
pub mod error;
pub mod expression;
pub mod input;
pub mod regularized;

pub use config::{ModelConfig, TestingConfig, WorkflowConfig};
pub use error::{Result, WorkflowError};
pub use expression::{DifferentialExpression, ExpressionOutcome};
pub use input::{load_survival_design, parse_group_labels, read_group_labels};
pub use regularized::{RegularizedOutcome, RegularizedWorkflow};
