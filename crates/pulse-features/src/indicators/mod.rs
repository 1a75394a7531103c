//! Technical Indicator Engine
//!
//! Computes causal technical indicators for every asset of a price panel.
//! Every indicator is a polars expression evaluated over each asset's
//! chronological rows, so a value at date D depends only on the same asset's
//! observations up to D.

pub mod momentum;
pub mod trend;
pub mod volatility;
pub mod volume;

use polars::prelude::*;
use tracing::{info, warn};

use crate::config::IndicatorConfig;
use crate::{FeatureError, FeatureStage, Result, frame};

/// Name of the moving-average crossover flag
pub const CROSSOVER_COLUMN: &str = "ma_cross_short_medium";

/// Trailing window of `window_size` rows that needs `min_periods` values
pub(crate) fn window(window_size: usize, min_periods: usize) -> RollingOptionsFixedWindow {
    RollingOptionsFixedWindow {
        window_size,
        min_periods,
        ..Default::default()
    }
}

/// Computes RSI, MACD, Bollinger bands, moving averages, volatility, returns,
/// momentum and volume indicators per asset
#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    config: IndicatorConfig,
}

impl IndicatorEngine {
    /// Engine with explicit parameters
    pub const fn with_config(config: IndicatorConfig) -> Self {
        Self { config }
    }

    /// Parameters in use
    pub const fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    /// Named indicator expressions over `close` and `volume`, in output order.
    ///
    /// Each expression reads one asset's chronological rows; the caller
    /// partitions them with `.over([col("asset")])`.
    pub fn exprs(&self) -> Vec<(String, Expr)> {
        let cfg = &self.config;
        let close = || col("close");
        let mut out: Vec<(String, Expr)> = Vec::new();

        out.push(("rsi".into(), momentum::rsi(close(), cfg.rsi_period)));

        let macd = trend::macd(close(), cfg.macd_fast, cfg.macd_slow, cfg.macd_signal);
        out.push(("macd".into(), macd.line));
        out.push(("macd_signal".into(), macd.signal));
        out.push(("macd_histogram".into(), macd.histogram));

        let bands = volatility::bollinger(close(), cfg.bb_period, cfg.bb_std_mult);
        out.push(("bb_upper".into(), bands.upper));
        out.push(("bb_middle".into(), bands.middle));
        out.push(("bb_lower".into(), bands.lower));
        out.push(("bb_width".into(), bands.width));
        out.push(("bb_position".into(), bands.position));

        let ma_short = trend::moving_average(close(), cfg.ma_short);
        let ma_medium = trend::moving_average(close(), cfg.ma_medium);
        let ma_long = trend::moving_average(close(), cfg.ma_long);
        let crossover = trend::crossover(ma_short.clone(), ma_medium.clone());
        let dist_short = trend::distance_from_ma(close(), ma_short.clone());
        let dist_medium = trend::distance_from_ma(close(), ma_medium.clone());
        out.push((format!("ma_{}", cfg.ma_short), ma_short));
        out.push((format!("ma_{}", cfg.ma_medium), ma_medium));
        out.push((format!("ma_{}", cfg.ma_long), ma_long));
        out.push((CROSSOVER_COLUMN.into(), crossover));

        out.push((
            "volatility".into(),
            volatility::annualized_volatility(close(), cfg.volatility_window, cfg.annualization),
        ));

        for &days in &cfg.return_horizons {
            out.push((format!("returns_{days}d"), momentum::returns(close(), days)));
        }

        let volume_ma = volume::volume_ma(col("volume"), cfg.volume_window);
        let volume_ratio = volume::safe_ratio(col("volume"), volume_ma.clone());
        out.push(("volume_ma".into(), volume_ma));
        out.push(("volume_ratio".into(), volume_ratio));
        out.push(("obv".into(), volume::obv(close(), col("volume"))));

        for &days in &cfg.momentum_horizons {
            out.push((format!("momentum_{days}d"), momentum::momentum(close(), days)));
        }

        out.push(("dist_from_ma_short".into(), dist_short));
        out.push(("dist_from_ma_medium".into(), dist_medium));
        out
    }

    /// Names of the columns [`Self::exprs`] produces, in order
    pub fn column_names(&self) -> Vec<String> {
        self.exprs().into_iter().map(|(name, _)| name).collect()
    }

    /// Run the engine, calling `on_asset` once per asset in panel order.
    ///
    /// Assets with fewer than `min_history` rows are skipped with a warning and
    /// do not appear in the output.
    pub fn apply_with_progress<F>(&self, frame: DataFrame, mut on_asset: F) -> Result<DataFrame>
    where
        F: FnMut(&str),
    {
        self.validate(&frame)?;
        let panel = frame::sort_panel(frame)?;
        let ranges = frame::asset_ranges(&panel)?;

        let mut keep = vec![false; panel.height()];
        let mut processed = 0usize;
        for asset in &ranges {
            if asset.len() < self.config.min_history {
                warn!(
                    asset = %asset.asset,
                    observations = asset.len(),
                    min_history = self.config.min_history,
                    "insufficient history, skipping asset"
                );
                continue;
            }
            keep[asset.rows.clone()].iter_mut().for_each(|k| *k = true);
            processed += 1;
        }

        if processed == 0 {
            return Err(FeatureError::EmptyDataset {
                stage: self.name().to_string(),
            });
        }

        let exprs: Vec<Expr> = self
            .exprs()
            .into_iter()
            .map(|(name, expr)| expr.over([col("asset")]).alias(name))
            .collect();
        let out = frame::keep_rows(&panel, &keep)?
            .lazy()
            .with_columns([
                col("close").cast(DataType::Float64),
                col("volume").cast(DataType::Float64),
            ])
            .with_columns(exprs)
            .collect()?;
        for asset in &ranges {
            on_asset(&asset.asset);
        }

        info!(assets = processed, rows = out.height(), "computed technical indicators");
        Ok(out)
    }
}

impl FeatureStage for IndicatorEngine {
    fn name(&self) -> &str {
        "indicator_engine"
    }

    fn required_columns(&self) -> Vec<String> {
        ["date", "asset", "asset_type", "close", "volume"]
            .map(String::from)
            .to_vec()
    }

    fn apply(&self, frame: DataFrame) -> Result<DataFrame> {
        self.apply_with_progress(frame, |_| {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn panel(assets: &[(&str, usize)]) -> DataFrame {
        let mut dates = Vec::new();
        let mut names = Vec::new();
        let mut close = Vec::new();
        for (asset, n) in assets {
            for i in 0..*n {
                dates.push(frame::date_to_day(
                    chrono::NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
                        + chrono::Days::new(i as u64),
                ));
                names.push(asset.to_string());
                close.push(100.0 + (i as f64 / 5.0).sin() * 3.0 + i as f64 * 0.1);
            }
        }
        let volume = vec![1_000.0; close.len()];
        let types = vec!["stock"; close.len()];
        DataFrame::new(vec![
            Series::new("date".into(), dates)
                .cast(&DataType::Date)
                .unwrap()
                .into(),
            Series::new("asset".into(), names).into(),
            Series::new("asset_type".into(), types).into(),
            Series::new("close".into(), close).into(),
            Series::new("volume".into(), volume).into(),
        ])
        .unwrap()
    }

    #[test]
    fn test_column_names() {
        let names = IndicatorEngine::default().column_names();
        assert_eq!(names.first().map(String::as_str), Some("rsi"));
        for expected in ["ma_7", "ma_30", "ma_90", "returns_30d", "momentum_7d", "obv"] {
            assert!(names.iter().any(|n| n == expected), "missing {expected}");
        }
    }

    #[test]
    fn test_short_asset_is_skipped() {
        let engine = IndicatorEngine::default();
        let out = engine.apply(panel(&[("LONG", 120), ("SHORT", 50)])).unwrap();
        assert_eq!(out.height(), 120);
        let assets = frame::str_values(&out, "asset").unwrap();
        assert!(assets.iter().all(|a| a == "LONG"));
    }

    #[test]
    fn test_progress_visits_every_asset() {
        let mut seen = Vec::new();
        IndicatorEngine::default()
            .apply_with_progress(panel(&[("A", 100), ("B", 10)]), |a| seen.push(a.to_string()))
            .unwrap();
        assert_eq!(seen, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_all_short_is_empty_dataset() {
        let err = IndicatorEngine::default()
            .apply(panel(&[("A", 20)]))
            .unwrap_err();
        assert!(matches!(err, FeatureError::EmptyDataset { .. }));
    }

    #[test]
    fn test_volume_ratio_of_constant_volume() {
        let out = IndicatorEngine::default()
            .apply(panel(&[("A", 100)]))
            .unwrap();
        let ratio = frame::float_values(&out, "volume_ratio").unwrap();
        assert!(ratio[18].is_nan());
        assert_relative_eq!(ratio[19], 1.0);
    }

    #[test]
    fn test_rolling_windows_restart_per_asset() {
        let out = IndicatorEngine::default()
            .apply(panel(&[("A", 100), ("B", 100)]))
            .unwrap();
        let ma = frame::float_values(&out, "ma_7").unwrap();
        assert!(!ma[99].is_nan());
        assert!(ma[100..106].iter().all(|v| v.is_nan()));
        assert!(!ma[106].is_nan());
        let obv = frame::float_values(&out, "obv").unwrap();
        assert_relative_eq!(obv[100], 0.0);
    }
}
