#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod design;
pub mod error;
pub mod expression;
pub mod frame;
pub mod simulate;
pub mod survival;

pub use design::{Design, StandardizeConfig, Standardization};
pub use error::{DataError, Result};
pub use expression::ExpressionSet;
pub use simulate::{ExpressionSimulation, SparseLinearModel};
pub use survival::SurvivalResponse;
