//! Column access helpers over panel frames.
//!
//! Stages pull columns out as plain vectors (nulls become `NaN`), compute on
//! slices per asset, then write the results back as new columns.

use chrono::NaiveDate;
use polars::prelude::*;
use pulse_data::dates;
use std::ops::Range;

use crate::{FeatureError, Result};

/// Contiguous rows of one asset in a panel sorted by (asset, date)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRows {
    /// Asset identifier
    pub asset: String,
    /// Row range in the frame
    pub rows: Range<usize>,
}

impl AssetRows {
    /// Number of observations
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the range is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Fail with [`FeatureError::MissingColumn`] unless every column exists
pub fn require_columns(frame: &DataFrame, stage: &str, columns: &[&str]) -> Result<()> {
    let present = frame.get_column_names();
    match columns
        .iter()
        .find(|c| !present.iter().any(|p| p.as_str() == **c))
    {
        Some(missing) => Err(FeatureError::MissingColumn {
            stage: stage.to_string(),
            column: (*missing).to_string(),
        }),
        None => Ok(()),
    }
}

/// Sort a panel by (asset, date)
pub fn sort_panel(frame: DataFrame) -> Result<DataFrame> {
    Ok(frame
        .lazy()
        .sort(
            ["asset", "date"],
            SortMultipleOptions::default().with_maintain_order(true),
        )
        .collect()?)
}

/// Numeric column as `f64`, nulls mapped to `NaN`
pub fn float_values(frame: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = frame.column(name)?.cast(&DataType::Float64)?;
    Ok(column
        .f64()?
        .iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect())
}

/// String column, nulls mapped to the empty string
pub fn str_values(frame: &DataFrame, name: &str) -> Result<Vec<String>> {
    let column = frame.column(name)?.cast(&DataType::String)?;
    Ok(column
        .str()?
        .iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect())
}

/// The `date` column as days since the Unix epoch
pub fn date_days(frame: &DataFrame) -> Result<Vec<i32>> {
    let column = frame.column("date")?.cast(&DataType::Int32)?;
    column
        .i32()?
        .iter()
        .map(|v| v.ok_or_else(|| FeatureError::NullValue("date".to_string())))
        .collect()
}

/// Calendar date of an epoch day count
pub fn day_to_date(days: i32) -> Option<NaiveDate> {
    dates::from_epoch_days(days)
}

/// Epoch day count of a calendar date
pub fn date_to_day(date: NaiveDate) -> i32 {
    dates::epoch_days(date)
}

/// Row ranges per asset. The frame must be sorted by asset.
pub fn asset_ranges(frame: &DataFrame) -> Result<Vec<AssetRows>> {
    let assets = str_values(frame, "asset")?;
    let mut ranges: Vec<AssetRows> = Vec::new();
    for (i, asset) in assets.into_iter().enumerate() {
        match ranges.last_mut() {
            Some(last) if last.asset == asset => last.rows.end = i + 1,
            _ => ranges.push(AssetRows {
                asset,
                rows: i..i + 1,
            }),
        }
    }
    Ok(ranges)
}

/// Add or replace a float column
pub fn put_float(frame: &mut DataFrame, name: &str, values: Vec<f64>) -> Result<()> {
    frame.with_column(Series::new(name.into(), values))?;
    Ok(())
}

/// Keep the rows where `mask` is true
pub fn keep_rows(frame: &DataFrame, mask: &[bool]) -> Result<DataFrame> {
    let mask = BooleanChunked::from_slice("mask".into(), mask);
    Ok(frame.filter(&mask)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> DataFrame {
        df![
            "date" => ["2024-01-01", "2024-01-02", "2024-01-01"],
            "asset" => ["BTC", "BTC", "ETH"],
            "close" => [Some(1.0), None, Some(3.0)],
        ]
        .unwrap()
        .lazy()
        .with_column(col("date").cast(DataType::Date))
        .collect()
        .unwrap()
    }

    #[test]
    fn test_float_values_maps_nulls_to_nan() {
        let values = float_values(&panel(), "close").unwrap();
        assert_eq!(values[0], 1.0);
        assert!(values[1].is_nan());
    }

    #[test]
    fn test_asset_ranges() {
        let ranges = asset_ranges(&panel()).unwrap();
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0].rows, 0..2);
        assert_eq!(ranges[1].asset, "ETH");
        assert_eq!(ranges[1].rows, 2..3);
    }

    #[test]
    fn test_epoch_days() {
        let days = date_days(&panel()).unwrap();
        let first = day_to_date(days[0]).unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(date_to_day(first), days[0]);
        assert_eq!(days[1] - days[0], 1);
    }

    #[test]
    fn test_require_columns() {
        let err = require_columns(&panel(), "test", &["asset", "volume"]).unwrap_err();
        assert!(matches!(err, FeatureError::MissingColumn { column, .. } if column == "volume"));
    }
}
