#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/pulse/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod aggregates;
pub mod align;
pub mod composer;
pub mod config;
pub mod error;
pub mod frame;
pub mod indicators;
pub mod labels;
pub mod registry;
pub mod search;
pub mod sentiment;
pub mod stats;

use polars::prelude::DataFrame;

pub use align::{AlignedPanel, DroppedAsset, TimeSeriesAligner};
pub use composer::FeatureComposer;
pub use config::{
    EngineeredConfig, IndicatorConfig, LabelConfig, LagWindowConfig, PipelineConfig,
    ThresholdTier,
};
pub use error::{FeatureError, Result};
pub use indicators::IndicatorEngine;
pub use labels::LabelGenerator;
pub use registry::{FeatureCatalog, FeatureCategory, FeatureInfo};
pub use search::{SearchInterestAggregator, SearchInterestFeed};
pub use sentiment::{DailyMarketSentiment, DailySentimentIndex, SentimentAggregator};

/// A pipeline stage that transforms a panel frame into a wider one
pub trait FeatureStage {
    /// Stage name used in logs and errors
    fn name(&self) -> &str;

    /// Columns the input frame must carry
    fn required_columns(&self) -> Vec<String>;

    /// Run the stage
    fn apply(&self, frame: DataFrame) -> Result<DataFrame>;

    /// Check the input frame before running
    fn validate(&self, frame: &DataFrame) -> Result<()> {
        let required = self.required_columns();
        let required: Vec<&str> = required.iter().map(String::as_str).collect();
        frame::require_columns(frame, self.name(), &required)
    }
}
