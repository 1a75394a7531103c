#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/pulse/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod inputs;
pub mod pipeline;
pub mod universe;

// Re-export main types from sub-crates
pub use pulse_data as data;
pub use pulse_features as features;
pub use pulse_output as output;

pub use error::{PipelineError, Result};
pub use inputs::{DataLayout, PipelineInputs};
pub use pipeline::{Pipeline, PipelineOutput, TechnicalPanel};
pub use pulse_features::PipelineConfig;
pub use universe::{AssetSpec, DefaultUniverse, Universe};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
