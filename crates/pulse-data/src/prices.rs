//! Price table loading.
//!
//! One CSV per asset class. Rows are `date, asset, open, high, low, close,
//! volume`; header aliases (`symbol`/`ticker` for the asset, `price` for the
//! close) are accepted. Series that only carry a single price are widened so
//! that open, high and low equal the close.

use polars::prelude::*;
use std::path::Path;
use tracing::{debug, warn};

use crate::dates::{epoch_days, parse_date};
use crate::news::HeaderIndex;
use crate::types::{AssetClass, PricePoint};
use crate::{DataError, Result};

const DATE_ALIASES: &[&str] = &["date", "timestamp", "datetime"];
const ASSET_ALIASES: &[&str] = &["asset", "symbol", "ticker"];
const CLOSE_ALIASES: &[&str] = &["close", "price", "adj_close"];

/// Read a price CSV into typed points.
///
/// A missing file is a [`DataError::MissingInput`]. Rows whose date or close
/// cannot be parsed are skipped with a warning.
pub fn read_price_points(path: &Path, class: AssetClass) -> Result<Vec<PricePoint>> {
    if !path.exists() {
        return Err(DataError::MissingInput {
            path: path.to_path_buf(),
        });
    }

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = HeaderIndex::new(reader.headers()?);

    let date_idx = headers
        .find(DATE_ALIASES)
        .ok_or_else(|| missing_column("date", path))?;
    let asset_idx = headers
        .find(ASSET_ALIASES)
        .ok_or_else(|| missing_column("asset", path))?;
    let close_idx = headers
        .find(CLOSE_ALIASES)
        .ok_or_else(|| missing_column("close", path))?;
    let open_idx = headers.find(&["open"]);
    let high_idx = headers.find(&["high"]);
    let low_idx = headers.find(&["low"]);
    let volume_idx = headers.find(&["volume"]);

    let mut points = Vec::new();
    let mut skipped = 0usize;
    for record in reader.records() {
        let record = record?;
        let field = |idx: usize| record.get(idx).map(str::trim).unwrap_or("");
        let number = |idx: Option<usize>| idx.and_then(|i| field(i).parse::<f64>().ok());

        let Ok(date) = parse_date(field(date_idx)) else {
            skipped += 1;
            continue;
        };
        let Some(close) = number(Some(close_idx)) else {
            skipped += 1;
            continue;
        };
        let asset = field(asset_idx);
        if asset.is_empty() {
            skipped += 1;
            continue;
        }

        points.push(PricePoint {
            date,
            asset: asset.to_string(),
            asset_type: class,
            open: number(open_idx).unwrap_or(close),
            high: number(high_idx).unwrap_or(close),
            low: number(low_idx).unwrap_or(close),
            close,
            volume: number(volume_idx).unwrap_or(0.0),
        });
    }

    if skipped > 0 {
        warn!(path = %path.display(), skipped, "skipped unparseable price rows");
    }
    debug!(path = %path.display(), rows = points.len(), class = %class, "loaded prices");
    Ok(points)
}

/// Load a price CSV as a frame with the uniform price schema
pub fn load_price_frame(path: &Path, class: AssetClass) -> Result<DataFrame> {
    let points = read_price_points(path, class)?;
    if points.is_empty() {
        return Err(DataError::EmptyInput {
            path: path.to_path_buf(),
        });
    }
    price_frame(&points)
}

/// Build a price frame (`date` typed as Date) from points
pub fn price_frame(points: &[PricePoint]) -> Result<DataFrame> {
    let dates: Vec<i32> = points
        .iter()
        .map(|p| epoch_days(p.date))
        .collect();
    let assets: Vec<&str> = points.iter().map(|p| p.asset.as_str()).collect();
    let classes: Vec<&str> = points.iter().map(|p| p.asset_type.as_str()).collect();
    let column = |f: fn(&PricePoint) -> f64| points.iter().map(f).collect::<Vec<f64>>();

    let df = DataFrame::new(vec![
        Series::new("date".into(), dates).into(),
        Series::new("asset".into(), assets).into(),
        Series::new("asset_type".into(), classes).into(),
        Series::new("open".into(), column(|p| p.open)).into(),
        Series::new("high".into(), column(|p| p.high)).into(),
        Series::new("low".into(), column(|p| p.low)).into(),
        Series::new("close".into(), column(|p| p.close)).into(),
        Series::new("volume".into(), column(|p| p.volume)).into(),
    ])?;

    let df = df
        .lazy()
        .with_column(col("date").cast(DataType::Date))
        .collect()?;
    Ok(df)
}

fn missing_column(column: &str, path: &Path) -> DataError {
    DataError::MissingColumn {
        column: column.to_string(),
        path: path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_price_alias_widens_ohlc() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "date,symbol,price,volume").unwrap();
        writeln!(file, "2024-01-01,BTC,42000.5,1200").unwrap();
        writeln!(file, "not-a-date,BTC,42000.5,1200").unwrap();

        let points = read_price_points(file.path(), AssetClass::Crypto).unwrap();
        assert_eq!(points.len(), 1);
        let p = &points[0];
        assert_eq!(p.asset, "BTC");
        assert_eq!(p.open, 42000.5);
        assert_eq!(p.high, 42000.5);
        assert_eq!(p.low, 42000.5);
        assert_eq!(p.volume, 1200.0);
    }

    #[test]
    fn test_missing_file_is_missing_input() {
        let err = read_price_points(Path::new("/nonexistent/prices.csv"), AssetClass::Stock)
            .unwrap_err();
        assert!(matches!(err, DataError::MissingInput { .. }));
    }

    #[test]
    fn test_price_frame_schema() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "date,asset,open,high,low,close,volume").unwrap();
        writeln!(file, "2024-01-02,MC.PA,700,710,695,705,1000").unwrap();
        writeln!(file, "2024-01-03,MC.PA,705,720,704,718,1500").unwrap();

        let df = load_price_frame(file.path(), AssetClass::Stock).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.column("date").unwrap().dtype(), &DataType::Date);
        let names: Vec<&str> = df.get_column_names().iter().map(|s| s.as_str()).collect();
        assert_eq!(
            names,
            ["date", "asset", "asset_type", "open", "high", "low", "close", "volume"]
        );
    }
}
