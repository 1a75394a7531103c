//! Feature Composer
//!
//! Joins market sentiment and per-asset search interest onto the indicator
//! panel through trailing lag windows, then derives interaction, regime and
//! composite features.
//!
//! The join is an interval lookup: both auxiliary series are date-sorted and
//! each row binary-searches its window `[date - lag_days, date]`. Empty
//! windows resolve to neutral defaults (sentiment 0, search interest 50), so
//! "no signal" never shows up as a missing value.

pub mod cross_section;
pub mod engineered;
pub mod window;

use polars::prelude::*;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::config::{LagWindowConfig, PipelineConfig};
use crate::indicators::CROSSOVER_COLUMN;
use crate::search::SearchInterestFeed;
use crate::sentiment::DailySentimentIndex;
use crate::{FeatureError, FeatureStage, Result, frame};
pub use window::WindowStats;

/// Latest daily sentiment mean inside the window
pub const SENTIMENT_CURRENT: &str = "sentiment_current";
/// Latest search interest inside the window
pub const TRENDS_CURRENT: &str = "trends_interest_current";

/// Names of the lag-window columns for one window length
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LagColumns {
    /// Mean of daily sentiment means
    pub sentiment_mean: String,
    /// Population stddev of daily sentiment means
    pub sentiment_std: String,
    /// Lowest daily sentiment mean
    pub sentiment_min: String,
    /// Highest daily sentiment mean
    pub sentiment_max: String,
    /// Last minus first daily mean
    pub sentiment_trend: String,
    /// Mean daily stress index
    pub stress_index: String,
    /// Summed daily balance
    pub sentiment_balance: String,
    /// Days with news in the window
    pub sentiment_days: String,
    /// Mean search interest
    pub trends_mean: String,
    /// Population stddev of search interest
    pub trends_std: String,
    /// Lowest search interest
    pub trends_min: String,
    /// Highest search interest
    pub trends_max: String,
    /// Last minus first search interest
    pub trends_trend: String,
    /// Days with search data in the window
    pub trends_days: String,
}

impl LagColumns {
    /// Column names for the configured window
    pub fn new(config: &LagWindowConfig) -> Self {
        let s = config.suffix();
        Self {
            sentiment_mean: format!("sentiment_mean_{s}"),
            sentiment_std: format!("sentiment_std_{s}"),
            sentiment_min: format!("sentiment_min_{s}"),
            sentiment_max: format!("sentiment_max_{s}"),
            sentiment_trend: format!("sentiment_trend_{s}"),
            stress_index: format!("stress_index_{s}"),
            sentiment_balance: format!("sentiment_balance_{s}"),
            sentiment_days: format!("sentiment_days_{s}"),
            trends_mean: format!("trends_interest_mean_{s}"),
            trends_std: format!("trends_interest_std_{s}"),
            trends_min: format!("trends_interest_min_{s}"),
            trends_max: format!("trends_interest_max_{s}"),
            trends_trend: format!("trends_interest_trend_{s}"),
            trends_days: format!("trends_days_{s}"),
        }
    }

    /// Sentiment columns in output order
    pub fn sentiment(&self) -> Vec<String> {
        vec![
            self.sentiment_mean.clone(),
            self.sentiment_std.clone(),
            self.sentiment_min.clone(),
            self.sentiment_max.clone(),
            self.sentiment_trend.clone(),
            SENTIMENT_CURRENT.to_string(),
            self.stress_index.clone(),
            self.sentiment_balance.clone(),
            self.sentiment_days.clone(),
        ]
    }

    /// Search-interest columns in output order
    pub fn trends(&self) -> Vec<String> {
        vec![
            self.trends_mean.clone(),
            self.trends_std.clone(),
            self.trends_min.clone(),
            self.trends_max.clone(),
            self.trends_trend.clone(),
            TRENDS_CURRENT.to_string(),
            self.trends_days.clone(),
        ]
    }
}

/// Sentiment summary of one window
#[derive(Debug, Clone, Copy)]
struct SentimentWindow {
    stats: WindowStats,
    stress: f64,
    balance: f64,
}

/// Merges indicator, sentiment and search-interest streams per (asset, date)
#[derive(Debug, Clone)]
pub struct FeatureComposer<'a> {
    config: &'a PipelineConfig,
    columns: LagColumns,
    sentiment: Option<&'a DailySentimentIndex>,
    search: Option<&'a SearchInterestFeed>,
}

impl<'a> FeatureComposer<'a> {
    /// Composer without auxiliary data; attach it with the `with_*` methods
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self {
            config,
            columns: LagColumns::new(&config.lag_window),
            sentiment: None,
            search: None,
        }
    }

    /// Attach the daily market sentiment
    pub fn with_sentiment(mut self, index: &'a DailySentimentIndex) -> Self {
        self.sentiment = Some(index);
        self
    }

    /// Attach the search-interest feed
    pub fn with_search_interest(mut self, feed: &'a SearchInterestFeed) -> Self {
        self.search = Some(feed);
        self
    }

    /// Lag-window column names in use
    pub const fn columns(&self) -> &LagColumns {
        &self.columns
    }

    fn sentiment_window(&self, day: i32) -> SentimentWindow {
        let lag = &self.config.lag_window;
        let neutral = SentimentWindow {
            stats: WindowStats::neutral(lag.sentiment_default),
            stress: 0.0,
            balance: 0.0,
        };
        let (Some(index), Some(date)) = (self.sentiment, frame::day_to_date(day)) else {
            return neutral;
        };

        let days = index.window(date, lag.lag_days);
        let means: Vec<f64> = days.iter().map(|d| d.mean).collect();
        match WindowStats::from_values(&means) {
            Some(stats) => SentimentWindow {
                stats,
                stress: days.iter().map(|d| d.stress_index).sum::<f64>() / days.len() as f64,
                balance: days.iter().map(|d| d.balance as f64).sum(),
            },
            None => neutral,
        }
    }

    fn search_window(&self, asset: &str, day: i32) -> WindowStats {
        let lag = &self.config.lag_window;
        let (Some(feed), Some(date)) = (self.search, frame::day_to_date(day)) else {
            return WindowStats::neutral(lag.search_default);
        };
        let values: Vec<f64> = feed
            .window(asset, date, lag.lag_days)
            .iter()
            .map(|(_, v)| *v)
            .collect();
        WindowStats::from_values(&values).unwrap_or(WindowStats::neutral(lag.search_default))
    }

    /// Add the sentiment and search-interest window columns
    fn join_windows(&self, out: &mut DataFrame) -> Result<()> {
        if self.sentiment.is_none_or(|s| s.is_empty()) {
            warn!("no sentiment data, sentiment features use neutral defaults");
        }
        if self.search.is_none_or(|s| s.is_empty()) {
            warn!("no search-interest data, search features use neutral defaults");
        }

        let days = frame::date_days(out)?;
        let assets = frame::str_values(out, "asset")?;

        // Sentiment is market-wide, so every asset on a date shares one window
        let mut by_day: HashMap<i32, SentimentWindow> = HashMap::new();
        let sentiment: Vec<SentimentWindow> = days
            .iter()
            .map(|&day| *by_day.entry(day).or_insert_with(|| self.sentiment_window(day)))
            .collect();
        let trends: Vec<WindowStats> = assets
            .iter()
            .zip(&days)
            .map(|(asset, &day)| self.search_window(asset, day))
            .collect();

        let c = &self.columns;
        let pick = |f: fn(&SentimentWindow) -> f64| sentiment.iter().map(f).collect::<Vec<f64>>();
        frame::put_float(out, &c.sentiment_mean, pick(|w| w.stats.mean))?;
        frame::put_float(out, &c.sentiment_std, pick(|w| w.stats.std))?;
        frame::put_float(out, &c.sentiment_min, pick(|w| w.stats.min))?;
        frame::put_float(out, &c.sentiment_max, pick(|w| w.stats.max))?;
        frame::put_float(out, &c.sentiment_trend, pick(|w| w.stats.trend))?;
        frame::put_float(out, SENTIMENT_CURRENT, pick(|w| w.stats.current))?;
        frame::put_float(out, &c.stress_index, pick(|w| w.stress))?;
        frame::put_float(out, &c.sentiment_balance, pick(|w| w.balance))?;
        frame::put_float(out, &c.sentiment_days, pick(|w| w.stats.count as f64))?;

        let pick = |f: fn(&WindowStats) -> f64| trends.iter().map(f).collect::<Vec<f64>>();
        frame::put_float(out, &c.trends_mean, pick(|w| w.mean))?;
        frame::put_float(out, &c.trends_std, pick(|w| w.std))?;
        frame::put_float(out, &c.trends_min, pick(|w| w.min))?;
        frame::put_float(out, &c.trends_max, pick(|w| w.max))?;
        frame::put_float(out, &c.trends_trend, pick(|w| w.trend))?;
        frame::put_float(out, TRENDS_CURRENT, pick(|w| w.current))?;
        frame::put_float(out, &c.trends_days, pick(|w| w.count as f64))?;
        Ok(())
    }
}

impl FeatureStage for FeatureComposer<'_> {
    fn name(&self) -> &str {
        "feature_composer"
    }

    fn required_columns(&self) -> Vec<String> {
        let ind = &self.config.indicators;
        let mut columns: Vec<String> = [
            "date",
            "asset",
            "asset_type",
            "close",
            "volume",
            "rsi",
            "macd",
            "bb_position",
            "bb_width",
            "volatility",
            "returns_1d",
            "returns_7d",
            "momentum_7d",
            "volume_ratio",
            CROSSOVER_COLUMN,
        ]
        .map(String::from)
        .to_vec();
        columns.push(format!("ma_{}", ind.ma_short));
        columns.push(format!("ma_{}", ind.ma_medium));
        columns
    }

    fn apply(&self, frame: DataFrame) -> Result<DataFrame> {
        self.validate(&frame)?;
        let mut out = frame::sort_panel(frame)?;
        if out.height() == 0 {
            return Err(FeatureError::EmptyDataset {
                stage: self.name().to_string(),
            });
        }

        self.join_windows(&mut out)?;
        let out = engineered::add_engineered(out, &self.columns, self.config)?;
        let out = cross_section::add_cross_sectional(out, &self.columns, &self.config.engineered)?;

        info!(rows = out.height(), columns = out.width(), "composed features");
        Ok(out)
    }
}
