//! Time-Series Aligner
//!
//! Stacks per-class price tables into one panel keyed by (asset, date) with a
//! uniform schema and drops assets whose history is too short for the
//! indicator windows.

use polars::prelude::*;
use tracing::{debug, info, warn};

use crate::{FeatureError, Result, frame};

/// Columns of an aligned price panel, in order
pub const PRICE_COLUMNS: [&str; 8] = [
    "date",
    "asset",
    "asset_type",
    "open",
    "high",
    "low",
    "close",
    "volume",
];

/// An asset removed for insufficient history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedAsset {
    /// Asset identifier
    pub asset: String,
    /// Observations it had
    pub observations: usize,
}

/// Output of the aligner
#[derive(Debug, Clone)]
pub struct AlignedPanel {
    /// Price panel sorted by (asset, date)
    pub frame: DataFrame,
    /// Assets that were dropped
    pub dropped: Vec<DroppedAsset>,
}

impl AlignedPanel {
    /// Assets kept in the panel, in order
    pub fn assets(&self) -> Result<Vec<String>> {
        Ok(frame::asset_ranges(&self.frame)?
            .into_iter()
            .map(|r| r.asset)
            .collect())
    }
}

/// Joins heterogeneous per-asset price series onto one (asset, date) grid
#[derive(Debug, Clone, Copy)]
pub struct TimeSeriesAligner {
    min_history: usize,
}

impl Default for TimeSeriesAligner {
    fn default() -> Self {
        Self::new(100)
    }
}

impl TimeSeriesAligner {
    /// Aligner dropping assets with fewer than `min_history` observations
    pub const fn new(min_history: usize) -> Self {
        Self { min_history }
    }

    /// Minimum observations per asset
    pub const fn min_history(&self) -> usize {
        self.min_history
    }

    /// Combine price tables into one panel.
    ///
    /// Every input must carry the price columns. Duplicate (asset, date) rows
    /// keep the last occurrence in input order.
    pub fn align(&self, tables: Vec<DataFrame>) -> Result<AlignedPanel> {
        if tables.is_empty() {
            return Err(FeatureError::EmptyDataset {
                stage: "align".to_string(),
            });
        }

        let mut uniform = Vec::with_capacity(tables.len());
        for table in tables {
            frame::require_columns(&table, "align", &PRICE_COLUMNS)?;
            uniform.push(table.lazy().select([
                col("date").cast(DataType::Date),
                col("asset").cast(DataType::String),
                col("asset_type").cast(DataType::String),
                col("open").cast(DataType::Float64),
                col("high").cast(DataType::Float64),
                col("low").cast(DataType::Float64),
                col("close").cast(DataType::Float64),
                col("volume").cast(DataType::Float64),
            ]));
        }

        let combined = concat(uniform, UnionArgs::default())?
            .filter(col("date").is_not_null().and(col("close").is_not_null()))
            .collect()?;
        let combined = frame::sort_panel(combined)?;

        // After a stable sort the last row of each (asset, date) run is the latest input
        let assets = frame::str_values(&combined, "asset")?;
        let days = frame::date_days(&combined)?;
        let n = combined.height();
        let unique: Vec<bool> = (0..n)
            .map(|i| i + 1 == n || assets[i] != assets[i + 1] || days[i] != days[i + 1])
            .collect();
        let duplicates = unique.iter().filter(|u| !**u).count();
        if duplicates > 0 {
            debug!(duplicates, "dropped duplicate (asset, date) rows");
        }
        let deduped = frame::keep_rows(&combined, &unique)?;

        let mut keep = vec![false; deduped.height()];
        let mut dropped = Vec::new();
        for asset in frame::asset_ranges(&deduped)? {
            if asset.len() < self.min_history {
                warn!(
                    asset = %asset.asset,
                    observations = asset.len(),
                    min_history = self.min_history,
                    "insufficient history, dropping asset"
                );
                dropped.push(DroppedAsset {
                    observations: asset.len(),
                    asset: asset.asset,
                });
            } else {
                keep[asset.rows].iter_mut().for_each(|k| *k = true);
            }
        }

        let panel = frame::keep_rows(&deduped, &keep)?;
        if panel.height() == 0 {
            return Err(FeatureError::EmptyDataset {
                stage: "align".to_string(),
            });
        }

        info!(
            rows = panel.height(),
            dropped = dropped.len(),
            "aligned price panel"
        );
        Ok(AlignedPanel {
            frame: panel,
            dropped,
        })
    }
}
