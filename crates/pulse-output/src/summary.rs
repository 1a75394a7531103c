//! Dataset statistics.
//!
//! A [`DatasetSummary`] describes a finalized table: its shape, date range,
//! per-class coverage, feature counts per category and the class balance of
//! every direction target.

use chrono::NaiveDate;
use polars::prelude::*;
use pulse_features::frame;
use pulse_features::{FeatureCatalog, FeatureCategory};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::Result;

/// Coverage of one asset class
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassSummary {
    /// Asset class name
    pub asset_type: String,
    /// Distinct assets
    pub assets: usize,
    /// Rows
    pub rows: usize,
}

/// Class balance of one direction target
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetBalance {
    /// Target column
    pub column: String,
    /// Rows labelled 1
    pub positive: usize,
    /// Rows with a label
    pub total: usize,
}

impl TargetBalance {
    /// Share of positive labels, 0 for an empty column
    pub fn positive_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.positive as f64 / self.total as f64
        }
    }
}

/// Statistics of a finalized table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatasetSummary {
    /// Rows
    pub rows: usize,
    /// Columns
    pub columns: usize,
    /// Earliest date
    pub start_date: Option<NaiveDate>,
    /// Latest date
    pub end_date: Option<NaiveDate>,
    /// Coverage per asset class, by class name
    pub classes: Vec<ClassSummary>,
    /// Present feature columns per category
    pub feature_counts: BTreeMap<String, usize>,
    /// Balance of every direction target present
    pub targets: Vec<TargetBalance>,
    /// Null or `NaN` cells across the table
    pub missing_values: usize,
}

impl DatasetSummary {
    /// Summarize `table` using `catalog` to categorize its columns
    pub fn from_table(table: &DataFrame, catalog: &FeatureCatalog) -> Result<Self> {
        let days = frame::date_days(table)?;
        let start_date = days.iter().min().copied().and_then(frame::day_to_date);
        let end_date = days.iter().max().copied().and_then(frame::day_to_date);

        let assets = frame::str_values(table, "asset")?;
        let classes = frame::str_values(table, "asset_type")?;
        let mut by_class: BTreeMap<String, (BTreeSet<&str>, usize)> = BTreeMap::new();
        for (asset, class) in assets.iter().zip(&classes) {
            let entry = by_class.entry(class.clone()).or_default();
            entry.0.insert(asset.as_str());
            entry.1 += 1;
        }
        let classes = by_class
            .into_iter()
            .map(|(asset_type, (assets, rows))| ClassSummary {
                asset_type,
                assets: assets.len(),
                rows,
            })
            .collect();

        let mut feature_counts = BTreeMap::new();
        for column in table.get_column_names() {
            if let Some(info) = catalog.get(column.as_str()) {
                *feature_counts
                    .entry(info.category.as_str().to_string())
                    .or_insert(0) += 1;
            }
        }

        let mut targets = Vec::new();
        for info in catalog.by_category(FeatureCategory::Target) {
            if !info.name.starts_with("target_direction_") {
                continue;
            }
            let Ok(column) = table.column(&info.name) else {
                continue;
            };
            let labels = column.cast(&DataType::Int32)?;
            let labels: Vec<i32> = labels.i32()?.into_iter().flatten().collect();
            targets.push(TargetBalance {
                column: info.name.clone(),
                positive: labels.iter().filter(|l| **l == 1).count(),
                total: labels.len(),
            });
        }

        let mut missing_values = 0;
        for column in table.get_columns() {
            missing_values += column.null_count();
            if column.dtype().is_float() {
                missing_values += frame::float_values(table, column.name().as_str())?
                    .iter()
                    .zip(column.is_null().into_iter())
                    .filter(|(v, null)| v.is_nan() && *null != Some(true))
                    .count();
            }
        }

        Ok(Self {
            rows: table.height(),
            columns: table.width(),
            start_date,
            end_date,
            classes,
            feature_counts,
            targets,
            missing_values,
        })
    }

    /// Rows of one asset class, 0 when absent
    pub fn class_rows(&self, asset_type: &str) -> usize {
        self.classes
            .iter()
            .find(|c| c.asset_type == asset_type)
            .map_or(0, |c| c.rows)
    }
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dataset: {} rows x {} columns", self.rows, self.columns)?;
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            writeln!(f, "Period:  {start} to {end}")?;
        }
        for class in &self.classes {
            writeln!(
                f,
                "  {:<10} {:>4} assets {:>8} rows",
                class.asset_type, class.assets, class.rows
            )?;
        }
        writeln!(f, "Features:")?;
        for (category, count) in &self.feature_counts {
            writeln!(f, "  {category:<16} {count:>4}")?;
        }
        writeln!(f, "Targets:")?;
        for target in &self.targets {
            writeln!(
                f,
                "  {:<22} {:>6.2}% positive ({}/{})",
                target.column,
                target.positive_rate() * 100.0,
                target.positive,
                target.total
            )?;
        }
        write!(f, "Missing values: {}", self.missing_values)
    }
}
