#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/pulse/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod export;
pub mod finalize;
pub mod summary;

pub use error::{OutputError, Result};
pub use export::{ExportFormat, Exporter, write_sample, write_table};
pub use finalize::DatasetFinalizer;
pub use summary::{ClassSummary, DatasetSummary, TargetBalance};
