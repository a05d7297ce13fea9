#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod adjust;
pub mod error;
pub mod moderated;
pub mod special;
pub mod table;
pub mod ttest;

pub use adjust::{AdjustmentMethod, adjust_p_values};
pub use error::{Result, TestingError};
pub use moderated::{
    ModeratedConfig, ModeratedResult, ModeratedTest, PriorEstimate, fit_f_dist, squeeze_variances,
};
pub use table::{TestRow, TestTable};
pub use ttest::{GroupMoments, TTestVariant, two_sample_t_test};
