#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cv;
pub mod elastic_net;
pub mod engine;
pub mod error;
pub mod linalg;
pub mod ols;
pub mod path;
pub mod ridge;

// Re-export main types
pub use cv::{
    CrossValidation, CrossValidationConfig, CrossValidationResult, FoldAssignment, FoldStatus,
    SelectionRule, ValidationLoss, concordance_index,
};
pub use elastic_net::{ElasticNet, ElasticNetConfig};
pub use engine::{CoefficientPath, PenalizedFit, Preprocessing};
pub use error::{PenalizedError, Result};
pub use ols::{OlsConfig, OlsFit, OrdinaryLeastSquares};
pub use path::{PathConfig, PenaltyPath};
pub use ridge::{RidgeConfig, RidgeSolver};
