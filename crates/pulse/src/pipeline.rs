//! End-to-end pipeline.
//!
//! Runs the stages in order: align, indicators, sentiment and search
//! aggregation, feature composition, labeling and finalization.

use polars::prelude::DataFrame;
use pulse_features::aggregates::daily_aggregates;
use pulse_features::{
    DailySentimentIndex, DroppedAsset, FeatureComposer, FeatureStage, IndicatorEngine,
    LabelGenerator, PipelineConfig, SearchInterestAggregator, SentimentAggregator,
    TimeSeriesAligner,
};
use pulse_output::{
    DatasetFinalizer, DatasetSummary, ExportFormat, Exporter, write_sample, write_table,
};
use std::path::Path;
use tracing::{info, warn};

use crate::Result;
use crate::error::PipelineError;
use crate::inputs::{DataLayout, PipelineInputs, load_prices};
use crate::universe::{DefaultUniverse, Universe};

/// Indicator panel and the assets the aligner removed
#[derive(Debug, Clone)]
pub struct TechnicalPanel {
    /// Aligned prices with indicator columns
    pub frame: DataFrame,
    /// Assets dropped for insufficient history
    pub dropped: Vec<DroppedAsset>,
}

/// Result of a full run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Final training table
    pub table: DataFrame,
    /// Assets dropped for insufficient history
    pub dropped: Vec<DroppedAsset>,
    /// Daily market sentiment used by the lag windows
    pub sentiment: DailySentimentIndex,
    /// Statistics of `table`
    pub summary: DatasetSummary,
}

impl PipelineOutput {
    /// Write the final table, its sample and the summary under `layout`
    pub fn write(&mut self, layout: &DataLayout) -> Result<()> {
        self.write_to(&layout.features_final(), &layout.features_sample())?;
        self.summary
            .export_to_file(&layout.summary(), ExportFormat::PrettyJson)?;
        Ok(())
    }

    /// Write the final table and its sample to explicit paths
    pub fn write_to(&mut self, table: &Path, sample: &Path) -> Result<()> {
        write_table(&mut self.table, table)?;
        write_sample(&self.table, sample)?;
        Ok(())
    }
}

/// Feature-engineering and labeling pipeline
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    universe: DefaultUniverse,
}

impl Pipeline {
    /// Pipeline over a validated configuration
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            universe: DefaultUniverse::new(),
        })
    }

    /// Load a JSON configuration; absent fields take their defaults
    pub fn from_config_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| PipelineError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(serde_json::from_str(&text)?)
    }

    /// Use a different asset universe for mention detection
    pub fn with_universe(mut self, universe: DefaultUniverse) -> Self {
        self.universe = universe;
        self
    }

    /// Configuration in use
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Asset universe in use
    pub const fn universe(&self) -> &DefaultUniverse {
        &self.universe
    }

    /// Load all inputs under `layout`
    pub fn load_inputs(&self, layout: &DataLayout) -> Result<PipelineInputs> {
        let detector = self.universe.mention_detector();
        PipelineInputs::load(layout, &self.config.sentiment, &detector)
    }

    /// Align prices and compute indicators, calling `on_asset` per asset
    pub fn technical<F>(&self, prices: Vec<DataFrame>, on_asset: F) -> Result<TechnicalPanel>
    where
        F: FnMut(&str),
    {
        let aligned = TimeSeriesAligner::new(self.config.indicators.min_history).align(prices)?;
        for asset in aligned.assets()? {
            if !self.universe.contains(&asset) {
                warn!(asset = %asset, "asset has no mention keywords, news will not reference it");
            }
        }
        let frame = IndicatorEngine::with_config(self.config.indicators.clone())
            .apply_with_progress(aligned.frame, on_asset)?;
        Ok(TechnicalPanel {
            frame,
            dropped: aligned.dropped,
        })
    }

    /// Technical panel from the price files under `layout`
    pub fn technical_from(&self, layout: &DataLayout) -> Result<TechnicalPanel> {
        self.technical(load_prices(layout)?, |_| {})
    }

    /// Daily per-class aggregates of a technical panel
    pub fn daily_aggregates(&self, technical: &TechnicalPanel) -> Result<DataFrame> {
        Ok(daily_aggregates(&technical.frame)?)
    }

    /// Run every stage
    pub fn run(&self, inputs: PipelineInputs) -> Result<PipelineOutput> {
        self.run_with_progress(inputs, |_| {})
    }

    /// Run every stage, calling `on_asset` as indicators finish per asset
    pub fn run_with_progress<F>(&self, inputs: PipelineInputs, on_asset: F) -> Result<PipelineOutput>
    where
        F: FnMut(&str),
    {
        let technical = self.technical(inputs.prices, on_asset)?;
        info!(
            rows = technical.frame.height(),
            dropped = technical.dropped.len(),
            "technical stage done"
        );

        let sentiment = SentimentAggregator::new(self.config.sentiment).aggregate(&inputs.events);
        let search = SearchInterestAggregator.aggregate(&inputs.search);
        info!(
            sentiment_days = sentiment.len(),
            search_assets = search.assets().count(),
            "aggregated auxiliary signals"
        );

        let mut composer = FeatureComposer::new(&self.config);
        if !sentiment.is_empty() {
            composer = composer.with_sentiment(&sentiment);
        }
        if !search.is_empty() {
            composer = composer.with_search_interest(&search);
        }
        let composed = composer.apply(technical.frame)?;
        let labeled = LabelGenerator::with_config(self.config.labels.clone()).apply(composed)?;

        let finalizer = DatasetFinalizer::new(&self.config);
        let table = finalizer.finalize(labeled)?;
        let summary = DatasetSummary::from_table(&table, finalizer.catalog())?;
        info!(
            rows = summary.rows,
            columns = summary.columns,
            "pipeline complete"
        );

        Ok(PipelineOutput {
            table,
            dropped: technical.dropped,
            sentiment,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_features::FeatureError;

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = PipelineConfig::default();
        config.labels.horizons.clear();
        let err = Pipeline::new(config).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Feature(FeatureError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_config_file_uses_defaults_for_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"labels": {"horizons": [3, 7]}}"#).unwrap();

        let pipeline = Pipeline::from_config_file(&path).unwrap();
        assert_eq!(pipeline.config().labels.horizons, vec![3, 7]);
        assert_eq!(
            pipeline.config().indicators,
            PipelineConfig::default().indicators
        );
    }

    #[test]
    fn test_missing_config_file() {
        let err = Pipeline::from_config_file(Path::new("/nonexistent/pulse.json")).unwrap_err();
        assert!(matches!(err, PipelineError::Config { .. }));
    }
}
