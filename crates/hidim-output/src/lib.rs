#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod coefficients;
pub mod cv_curve;
pub mod export;
pub mod report;
pub mod top_table;

pub use coefficients::{CoefficientRow, CoefficientTable, PathPoint, PathSummary};
pub use cv_curve::{CurvePoint, CvCurve};
pub use export::{ExportError, ExportFormat, Exporter};
pub use report::{Report, ReportBuilder, ReportError};
pub use top_table::TopTable;
