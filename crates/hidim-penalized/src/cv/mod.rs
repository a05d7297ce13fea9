//! Cross-validated penalty selection
//!
//! The penalty path is built once on the full data. Each fold refits the
//! engine on the remaining observations across that whole path and scores
//! the held-out observations at every λ. The K fold errors are averaged
//! without weighting into the CV curve, from which the penalty is picked by
//! the minimum or the one-standard-error rule.

pub mod folds;
pub mod loss;
pub mod selector;

pub use folds::FoldAssignment;
pub use loss::{ValidationLoss, concordance_index};
pub use selector::{
    CrossValidation, CrossValidationConfig, CrossValidationResult, FoldStatus, SelectionRule,
};
