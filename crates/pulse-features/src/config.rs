//! Pipeline configuration.
//!
//! One immutable [`PipelineConfig`] is built per run and handed to each stage
//! constructor. Every field has a default, so partial JSON files are accepted.

use pulse_data::SentimentPolicy;
use serde::{Deserialize, Serialize};

use crate::{FeatureError, Result};

/// Technical indicator parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    /// Assets with fewer observations are dropped (default: 100)
    pub min_history: usize,
    /// RSI period (default: 14)
    pub rsi_period: usize,
    /// MACD fast EMA span (default: 12)
    pub macd_fast: usize,
    /// MACD slow EMA span (default: 26)
    pub macd_slow: usize,
    /// MACD signal EMA span (default: 9)
    pub macd_signal: usize,
    /// Bollinger window (default: 20)
    pub bb_period: usize,
    /// Bollinger stddev multiplier (default: 2.0)
    pub bb_std_mult: f64,
    /// Short moving average (default: 7)
    pub ma_short: usize,
    /// Medium moving average (default: 30)
    pub ma_medium: usize,
    /// Long moving average (default: 90)
    pub ma_long: usize,
    /// Volatility window of daily returns (default: 20)
    pub volatility_window: usize,
    /// Periods per year used to annualize (default: 252)
    pub annualization: f64,
    /// Backward return horizons in days (default: 1, 7, 30)
    pub return_horizons: Vec<usize>,
    /// Price momentum horizons in days (default: 7, 30)
    pub momentum_horizons: Vec<usize>,
    /// Volume moving average window (default: 20)
    pub volume_window: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            min_history: 100,
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bb_period: 20,
            bb_std_mult: 2.0,
            ma_short: 7,
            ma_medium: 30,
            ma_long: 90,
            volatility_window: 20,
            annualization: 252.0,
            return_horizons: vec![1, 7, 30],
            momentum_horizons: vec![7, 30],
            volume_window: 20,
        }
    }
}

/// Lag window join parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LagWindowConfig {
    /// Calendar days looked back, the current date included (default: 7)
    pub lag_days: u32,
    /// Sentiment value used when the window is empty (default: 0)
    pub sentiment_default: f64,
    /// Search-interest level used when the window is empty (default: 50)
    pub search_default: f64,
}

impl Default for LagWindowConfig {
    fn default() -> Self {
        Self {
            lag_days: 7,
            sentiment_default: 0.0,
            search_default: 50.0,
        }
    }
}

impl LagWindowConfig {
    /// Suffix of windowed column names, e.g. `7d`
    pub fn suffix(&self) -> String {
        format!("{}d", self.lag_days)
    }
}

/// Engineered feature parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineeredConfig {
    /// Extra pct-change momentum horizons (default: 3, 14, 21)
    pub momentum_horizons: Vec<usize>,
    /// Short realized volatility window (default: 7)
    pub short_vol_window: usize,
    /// Long realized volatility window (default: 30)
    pub long_vol_window: usize,
    /// Guard added to moving averages in price-to-MA ratios (default: 1e-8)
    pub ma_epsilon: f64,
    /// Guard added to volatility in ratio features (default: 0.001)
    pub volatility_epsilon: f64,
    /// RSI change horizon (default: 3)
    pub rsi_change_days: usize,
    /// RSI moving average window (default: 7)
    pub rsi_ma_window: usize,
    /// Volume ratio above which volume surges (default: 1.5)
    pub volume_surge: f64,
    /// Volume spike multiples (default: 2, 3)
    pub volume_spikes: Vec<f64>,
    /// Trend-days window (default: 7)
    pub trend_window: usize,
    /// Search spike multiple of the window mean (default: 1.5)
    pub search_spike: f64,
    /// Lower Bollinger touch (default: 0.1)
    pub bb_lower_touch: f64,
    /// Upper Bollinger touch (default: 0.9)
    pub bb_upper_touch: f64,
    /// Squeeze lookback (default: 20)
    pub squeeze_window: usize,
    /// Squeeze quantile (default: 0.2)
    pub squeeze_quantile: f64,
    /// Upper quantile for extreme flags (default: 0.8)
    pub extreme_upper_quantile: f64,
    /// Lower quantile for extreme flags (default: 0.2)
    pub extreme_lower_quantile: f64,
    /// Extreme oversold RSI (default: 25)
    pub rsi_extreme_low: f64,
    /// Extreme overbought RSI (default: 75)
    pub rsi_extreme_high: f64,
    /// Oversold RSI bound (default: 30)
    pub rsi_oversold: f64,
    /// Overbought RSI bound (default: 70)
    pub rsi_overbought: f64,
    /// Lags of daily returns (default: 1, 2, 3)
    pub return_lags: Vec<usize>,
    /// Bullish confluence RSI bound (default: 35)
    pub confluence_rsi_low: f64,
    /// Bearish confluence RSI bound (default: 65)
    pub confluence_rsi_high: f64,
    /// Bullish confluence Bollinger bound (default: 0.2)
    pub confluence_bb_low: f64,
    /// Bearish confluence Bollinger bound (default: 0.8)
    pub confluence_bb_high: f64,
    /// Weekly return magnitude for confluence (default: 0.05)
    pub confluence_return: f64,
}

impl Default for EngineeredConfig {
    fn default() -> Self {
        Self {
            momentum_horizons: vec![3, 14, 21],
            short_vol_window: 7,
            long_vol_window: 30,
            ma_epsilon: 1e-8,
            volatility_epsilon: 0.001,
            rsi_change_days: 3,
            rsi_ma_window: 7,
            volume_surge: 1.5,
            volume_spikes: vec![2.0, 3.0],
            trend_window: 7,
            search_spike: 1.5,
            bb_lower_touch: 0.1,
            bb_upper_touch: 0.9,
            squeeze_window: 20,
            squeeze_quantile: 0.2,
            extreme_upper_quantile: 0.8,
            extreme_lower_quantile: 0.2,
            rsi_extreme_low: 25.0,
            rsi_extreme_high: 75.0,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            return_lags: vec![1, 2, 3],
            confluence_rsi_low: 35.0,
            confluence_rsi_high: 65.0,
            confluence_bb_low: 0.2,
            confluence_bb_high: 0.8,
            confluence_return: 0.05,
        }
    }
}

/// Direction threshold applying from `min_horizon` days upward
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdTier {
    /// Smallest horizon the tier covers
    pub min_horizon: usize,
    /// Absolute return threshold
    pub threshold: f64,
}

/// Forward label parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Forward horizons in days (default: 3, 7, 14)
    pub horizons: Vec<usize>,
    /// Threshold tiers ordered by `min_horizon` (default: <7 0.015, <14 0.02, else 0.03)
    pub tiers: Vec<ThresholdTier>,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            horizons: vec![3, 7, 14],
            tiers: vec![
                ThresholdTier {
                    min_horizon: 0,
                    threshold: 0.015,
                },
                ThresholdTier {
                    min_horizon: 7,
                    threshold: 0.02,
                },
                ThresholdTier {
                    min_horizon: 14,
                    threshold: 0.03,
                },
            ],
        }
    }
}

impl LabelConfig {
    /// Threshold of the last tier whose `min_horizon` is at most `horizon`
    pub fn threshold(&self, horizon: usize) -> f64 {
        self.tiers
            .iter()
            .filter(|t| t.min_horizon <= horizon)
            .max_by_key(|t| t.min_horizon)
            .map_or(0.0, |t| t.threshold)
    }
}

/// Complete per-run configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Indicator engine and aligner
    pub indicators: IndicatorConfig,
    /// Sentiment label thresholds
    pub sentiment: SentimentPolicy,
    /// Lag window join
    pub lag_window: LagWindowConfig,
    /// Engineered features
    pub engineered: EngineeredConfig,
    /// Labels
    pub labels: LabelConfig,
}

impl PipelineConfig {
    /// Reject configurations that cannot produce a table
    pub fn validate(&self) -> Result<()> {
        let ind = &self.indicators;
        let windows = [
            ("rsi_period", ind.rsi_period),
            ("macd_fast", ind.macd_fast),
            ("macd_slow", ind.macd_slow),
            ("macd_signal", ind.macd_signal),
            ("bb_period", ind.bb_period),
            ("ma_short", ind.ma_short),
            ("ma_medium", ind.ma_medium),
            ("ma_long", ind.ma_long),
            ("volatility_window", ind.volatility_window),
            ("volume_window", ind.volume_window),
        ];
        if let Some((name, _)) = windows.iter().find(|(_, w)| *w == 0) {
            return Err(FeatureError::InvalidConfig(format!("{name} must be positive")));
        }
        if ind.min_history < ind.ma_long {
            return Err(FeatureError::InvalidConfig(format!(
                "min_history ({}) shorter than the longest moving average ({})",
                ind.min_history, ind.ma_long
            )));
        }
        if !ind.return_horizons.contains(&1) || !ind.return_horizons.contains(&7) {
            return Err(FeatureError::InvalidConfig(
                "return_horizons must include 1 and 7".to_string(),
            ));
        }
        if !ind.momentum_horizons.contains(&7) {
            return Err(FeatureError::InvalidConfig(
                "momentum_horizons must include 7".to_string(),
            ));
        }
        if self.labels.horizons.is_empty() || self.labels.horizons.contains(&0) {
            return Err(FeatureError::InvalidConfig(
                "label horizons must be non-empty and positive".to_string(),
            ));
        }
        if self.lag_window.lag_days == 0 {
            return Err(FeatureError::InvalidConfig(
                "lag_days must be positive".to_string(),
            ));
        }
        let sentiment = &self.sentiment;
        if sentiment.negative_threshold > sentiment.positive_threshold {
            return Err(FeatureError::InvalidConfig(
                "negative sentiment threshold above positive threshold".to_string(),
            ));
        }
        Ok(())
    }
}
