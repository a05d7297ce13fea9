#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod workflow;

// Re-export main types from sub-crates
pub use hidim_data as data;
pub use hidim_output as output;
pub use hidim_penalized as penalized;
pub use hidim_testing as testing;

// Re-export common workflow types
pub use workflow::{
    DifferentialExpression, ExpressionOutcome, ModelConfig, RegularizedOutcome, RegularizedWorkflow,
    TestingConfig, WorkflowConfig, WorkflowError,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
