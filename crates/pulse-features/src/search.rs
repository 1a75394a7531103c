//! Search-Interest Aggregator
//!
//! Search interest is already one value per (asset, date) once keyword
//! variants are averaged, so the aggregator only reshapes the points into
//! per-asset, date-sorted series that support window lookups.

use chrono::{Days, NaiveDate};
use pulse_data::SearchInterestPoint;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// One asset's interest series
pub type InterestSeries = Vec<(NaiveDate, f64)>;

/// Per-asset search-interest series sorted by date
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchInterestFeed {
    series: BTreeMap<String, InterestSeries>,
}

impl SearchInterestFeed {
    /// Series of one asset, empty when unknown
    pub fn series(&self, asset: &str) -> &[(NaiveDate, f64)] {
        self.series.get(asset).map(Vec::as_slice).unwrap_or_default()
    }

    /// Assets with at least one observation
    pub fn assets(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// Whether no asset has observations
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Observations of `asset` in `[end - lag_days, end]`, both ends included
    pub fn window(&self, asset: &str, end: NaiveDate, lag_days: u32) -> &[(NaiveDate, f64)] {
        let series = self.series(asset);
        let start = end
            .checked_sub_days(Days::new(u64::from(lag_days)))
            .unwrap_or(NaiveDate::MIN);
        let lo = series.partition_point(|(d, _)| *d < start);
        let hi = series.partition_point(|(d, _)| *d <= end);
        &series[lo..hi.max(lo)]
    }
}

/// Builds a [`SearchInterestFeed`] from raw points
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchInterestAggregator;

impl SearchInterestAggregator {
    /// Average duplicate (asset, date) points, clamp to [0, 100], sort by date
    pub fn aggregate(&self, points: &[SearchInterestPoint]) -> SearchInterestFeed {
        let mut sums: BTreeMap<(String, NaiveDate), (f64, usize)> = BTreeMap::new();
        for p in points.iter().filter(|p| p.interest.is_finite()) {
            let entry = sums.entry((p.asset.clone(), p.date)).or_insert((0.0, 0));
            entry.0 += p.interest;
            entry.1 += 1;
        }

        let merged = points.len().saturating_sub(sums.len());
        if merged > 0 {
            debug!(merged, "averaged duplicate search-interest points");
        }

        let mut series: BTreeMap<String, InterestSeries> = BTreeMap::new();
        // BTreeMap keys iterate by (asset, date), so each series is already sorted
        for ((asset, date), (sum, count)) in sums {
            let value = (sum / count as f64).clamp(0.0, 100.0);
            series.entry(asset).or_default().push((date, value));
        }

        info!(assets = series.len(), points = points.len(), "built search-interest feed");
        SearchInterestFeed { series }
    }
}
