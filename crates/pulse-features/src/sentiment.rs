//! Sentiment Aggregator
//!
//! Reduces scored articles to one market-wide row per calendar day. The
//! output is sparse: days without articles have no row, and consumers look
//! days up through [`DailySentimentIndex::window`].

use chrono::{Days, NaiveDate};
use polars::prelude::*;
use pulse_data::{SentimentEvent, SentimentLabel, SentimentPolicy};
use std::collections::BTreeMap;
use tracing::info;

use crate::{Result, frame, stats};

/// Market sentiment of one day with at least one article
#[derive(Debug, Clone, PartialEq)]
pub struct DailyMarketSentiment {
    /// Calendar day
    pub date: NaiveDate,
    /// Mean score
    pub mean: f64,
    /// Sample stddev of scores, 0 with a single article
    pub std: f64,
    /// Lowest score
    pub min: f64,
    /// Highest score
    pub max: f64,
    /// Positive minus negative articles
    pub balance: i64,
    /// `std * 100`
    pub stress_index: f64,
    /// Articles that day
    pub news_count: usize,
}

/// Date-sorted daily sentiment rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailySentimentIndex {
    days: Vec<DailyMarketSentiment>,
}

impl DailySentimentIndex {
    /// All days, ascending
    pub fn days(&self) -> &[DailyMarketSentiment] {
        &self.days
    }

    /// Number of days with articles
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Whether no day has articles
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Days in `[end - lag_days, end]`, both ends included
    pub fn window(&self, end: NaiveDate, lag_days: u32) -> &[DailyMarketSentiment] {
        let start = end
            .checked_sub_days(Days::new(u64::from(lag_days)))
            .unwrap_or(NaiveDate::MIN);
        let lo = self.days.partition_point(|d| d.date < start);
        let hi = self.days.partition_point(|d| d.date <= end);
        &self.days[lo..hi.max(lo)]
    }

    /// One row per day: `date, sentiment_mean, sentiment_std, sentiment_min,
    /// sentiment_max, sentiment_balance, stress_index, news_count`
    pub fn to_frame(&self) -> Result<DataFrame> {
        let days: Vec<i32> = self.days.iter().map(|d| frame::date_to_day(d.date)).collect();
        let field = |f: fn(&DailyMarketSentiment) -> f64| -> Vec<f64> {
            self.days.iter().map(f).collect()
        };
        let balance: Vec<i64> = self.days.iter().map(|d| d.balance).collect();
        let counts: Vec<u32> = self
            .days
            .iter()
            .map(|d| u32::try_from(d.news_count).unwrap_or(u32::MAX))
            .collect();

        Ok(DataFrame::new(vec![
            Series::new("date".into(), days).cast(&DataType::Date)?.into(),
            Series::new("sentiment_mean".into(), field(|d| d.mean)).into(),
            Series::new("sentiment_std".into(), field(|d| d.std)).into(),
            Series::new("sentiment_min".into(), field(|d| d.min)).into(),
            Series::new("sentiment_max".into(), field(|d| d.max)).into(),
            Series::new("sentiment_balance".into(), balance).into(),
            Series::new("stress_index".into(), field(|d| d.stress_index)).into(),
            Series::new("news_count".into(), counts).into(),
        ])?)
    }
}

/// Groups sentiment events by day
#[derive(Debug, Clone, Copy, Default)]
pub struct SentimentAggregator {
    policy: SentimentPolicy,
}

impl SentimentAggregator {
    /// Aggregator labelling scores with `policy`
    pub const fn new(policy: SentimentPolicy) -> Self {
        Self { policy }
    }

    /// Build the daily index.
    ///
    /// Labels are recomputed from scores with the configured policy, so the
    /// balance does not depend on which scorer produced an event.
    pub fn aggregate(&self, events: &[SentimentEvent]) -> DailySentimentIndex {
        let mut by_day: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
        for event in events.iter().filter(|e| e.sentiment_score.is_finite()) {
            by_day
                .entry(event.date)
                .or_default()
                .push(event.sentiment_score);
        }

        let days: Vec<DailyMarketSentiment> = by_day
            .into_iter()
            .map(|(date, scores)| {
                let std = if scores.len() < 2 {
                    0.0
                } else {
                    stats::sample_std(&scores)
                };
                let balance = scores
                    .iter()
                    .map(|s| match self.policy.label(*s) {
                        SentimentLabel::Positive => 1,
                        SentimentLabel::Negative => -1,
                        SentimentLabel::Neutral => 0,
                    })
                    .sum();
                DailyMarketSentiment {
                    date,
                    mean: stats::mean(&scores),
                    std,
                    min: scores.iter().copied().fold(f64::INFINITY, f64::min),
                    max: scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                    balance,
                    stress_index: std * 100.0,
                    news_count: scores.len(),
                }
            })
            .collect();

        info!(events = events.len(), days = days.len(), "aggregated daily sentiment");
        DailySentimentIndex { days }
    }
}
