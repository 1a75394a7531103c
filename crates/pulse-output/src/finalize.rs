//! Dataset Finalizer
//!
//! Turns the labeled feature panel into the training table:
//!
//! 1. drop rows missing any target,
//! 2. fill feature gaps forward then backward within each asset,
//! 3. drop rows still missing anything,
//! 4. order columns as identifiers, OHLCV, features, targets,
//! 5. sort by (asset, date).
//!
//! `NaN` and null both count as missing.

use polars::prelude::*;
use pulse_features::frame;
use pulse_features::registry::{META_COLUMNS, PRICE_COLUMNS};
use pulse_features::{FeatureCatalog, FeatureCategory, PipelineConfig};
use std::collections::HashSet;
use tracing::{debug, info};

use crate::{OutputError, Result};

/// Applies the missing-data policy and the final column order
#[derive(Debug, Clone)]
pub struct DatasetFinalizer {
    catalog: FeatureCatalog,
}

impl DatasetFinalizer {
    /// Finalizer for tables produced with `config`
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            catalog: FeatureCatalog::for_config(config),
        }
    }

    /// Finalizer over an explicit catalog
    pub const fn with_catalog(catalog: FeatureCatalog) -> Self {
        Self { catalog }
    }

    /// Catalog in use
    pub const fn catalog(&self) -> &FeatureCatalog {
        &self.catalog
    }

    /// Run the missing-data policy and order the columns
    pub fn finalize(&self, table: DataFrame) -> Result<DataFrame> {
        let targets = self.catalog.names(FeatureCategory::Target);
        for column in META_COLUMNS.iter().chain(&targets) {
            if table.column(column).is_err() {
                return Err(OutputError::MissingColumn((*column).to_string()));
            }
        }

        let input_rows = table.height();
        let table = frame::sort_panel(table)?;
        let complete = complete_rows(&table, &targets)?;
        let labeled = frame::keep_rows(&table, &complete)?;
        debug!(
            dropped = input_rows - labeled.height(),
            "dropped rows without targets"
        );

        let order = self.column_order(&labeled);
        let fill: Vec<&str> = order
            .iter()
            .map(String::as_str)
            .filter(|c| !META_COLUMNS.contains(c) && !targets.contains(c))
            .collect();
        let filled = fill_within_assets(labeled, &fill)?;

        let all: Vec<&str> = order.iter().map(String::as_str).collect();
        let complete = complete_rows(&filled, &all)?;
        let out = frame::keep_rows(&filled, &complete)?.select(order)?;
        if out.height() == 0 {
            return Err(OutputError::EmptyDataset("finalization".to_string()));
        }

        info!(
            input_rows,
            rows = out.height(),
            columns = out.width(),
            "finalized dataset"
        );
        Ok(out)
    }

    /// Identifiers, OHLCV, cataloged features, unknown columns alphabetically,
    /// then targets. Only columns present in `table` are listed.
    fn column_order(&self, table: &DataFrame) -> Vec<String> {
        let present: HashSet<&str> = table
            .get_column_names()
            .into_iter()
            .map(|c| c.as_str())
            .collect();
        let targets = self.catalog.names(FeatureCategory::Target);
        let mut order: Vec<String> = META_COLUMNS
            .iter()
            .chain(PRICE_COLUMNS.iter())
            .map(|c| (*c).to_string())
            .collect();
        order.extend(
            self.catalog
                .feature_names()
                .into_iter()
                .map(String::from),
        );

        let known: HashSet<&str> = order
            .iter()
            .map(String::as_str)
            .chain(targets.iter().copied())
            .collect();
        let mut unknown: Vec<String> = present
            .iter()
            .filter(|c| !known.contains(*c))
            .map(|c| (*c).to_string())
            .collect();
        unknown.sort();

        order.extend(unknown);
        order.extend(targets.iter().map(|t| (*t).to_string()));
        order.retain(|c| present.contains(c.as_str()));
        order
    }
}

/// Rows where every listed column has a value
fn complete_rows(table: &DataFrame, columns: &[&str]) -> Result<Vec<bool>> {
    let mut keep = vec![true; table.height()];
    for name in columns {
        let column = table.column(name)?;
        if column.dtype().is_float() {
            for (k, v) in keep.iter_mut().zip(frame::float_values(table, name)?) {
                *k &= !v.is_nan();
            }
        } else {
            for (k, missing) in keep.iter_mut().zip(column.is_null().into_iter()) {
                *k &= missing != Some(true);
            }
        }
    }
    Ok(keep)
}

/// Forward fill then backward fill inside each asset's rows. Float `NaN`
/// counts as a gap; the table must already be sorted by (asset, date).
fn fill_within_assets(table: DataFrame, columns: &[&str]) -> Result<DataFrame> {
    let mut exprs = Vec::with_capacity(columns.len());
    for &name in columns {
        let dtype = table.column(name)?.dtype().clone();
        let gaps = if dtype.is_float() {
            col(name).fill_nan(lit(NULL))
        } else if dtype.is_integer() || dtype == DataType::String {
            col(name)
        } else {
            continue;
        };
        exprs.push(
            gaps.forward_fill(None)
                .backward_fill(None)
                .over([col("asset")])
                .alias(name),
        );
    }
    Ok(table.lazy().with_columns(exprs).collect()?)
}
