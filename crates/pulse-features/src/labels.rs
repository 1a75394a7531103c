//! Label Generator
//!
//! Forward-looking targets per asset. `target_return_{H}d` is the simple
//! return from today's close to the close `H` rows later; the direction is
//! 1 when that return beats a threshold that widens with the horizon and 0
//! otherwise, so falls and the flat band share the 0 class.
//!
//! Rows whose forward close lies beyond the asset's history carry a missing
//! target and are dropped by the finalizer.

use polars::prelude::*;
use tracing::info;

use crate::config::LabelConfig;
use crate::{FeatureError, FeatureStage, Result, frame};

/// Forward return column for `horizon`
pub fn return_column(horizon: usize) -> String {
    format!("target_return_{horizon}d")
}

/// Direction column for `horizon`
pub fn direction_column(horizon: usize) -> String {
    format!("target_direction_{horizon}d")
}

/// Appends forward return and direction targets
#[derive(Debug, Clone, Default)]
pub struct LabelGenerator {
    config: LabelConfig,
}

impl LabelGenerator {
    /// Generator with custom horizons and thresholds
    pub const fn with_config(config: LabelConfig) -> Self {
        Self { config }
    }

    /// Label parameters
    pub const fn config(&self) -> &LabelConfig {
        &self.config
    }

    /// Target columns in output order: returns then directions per horizon
    pub fn column_names(&self) -> Vec<String> {
        self.config
            .horizons
            .iter()
            .flat_map(|&h| [return_column(h), direction_column(h)])
            .collect()
    }

    fn exprs(&self, horizon: usize) -> [Expr; 2] {
        let forward = col("close")
            .shift(lit(-(horizon as i64)))
            .over([col("asset")]);
        let ret = (forward / col("close") - lit(1.0)).alias(return_column(horizon));

        let threshold = self.config.threshold(horizon);
        let target = col(return_column(horizon));
        let direction = when(target.clone().is_null())
            .then(lit(NULL).cast(DataType::Int32))
            .when(target.gt(lit(threshold)))
            .then(lit(1i32))
            .otherwise(lit(0i32))
            .alias(direction_column(horizon));
        [ret, direction]
    }
}

impl FeatureStage for LabelGenerator {
    fn name(&self) -> &str {
        "label_generator"
    }

    fn required_columns(&self) -> Vec<String> {
        ["date", "asset", "close"].map(String::from).to_vec()
    }

    fn apply(&self, frame: DataFrame) -> Result<DataFrame> {
        self.validate(&frame)?;
        if frame.height() == 0 {
            return Err(FeatureError::EmptyDataset {
                stage: self.name().to_string(),
            });
        }

        let mut lazy = frame::sort_panel(frame)?.lazy();
        for &horizon in &self.config.horizons {
            let [ret, direction] = self.exprs(horizon);
            // Direction reads the return column, so it needs its own pass
            lazy = lazy.with_column(ret).with_column(direction);
        }
        let out = lazy.collect()?;

        info!(horizons = ?self.config.horizons, rows = out.height(), "generated labels");
        Ok(out)
    }
}
