//! Domain types shared across the pipeline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::DataError;

/// Asset class of a traded instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    /// Crypto currencies, traded every calendar day
    Crypto,
    /// Listed equities, traded on exchange sessions
    Stock,
}

impl AssetClass {
    /// Label written to the `asset_type` column
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Crypto => "crypto",
            Self::Stock => "stock",
        }
    }

    /// Every asset class, in output order
    pub const fn all() -> [Self; 2] {
        [Self::Crypto, Self::Stock]
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetClass {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "crypto" => Ok(Self::Crypto),
            "stock" | "stocks" | "equity" => Ok(Self::Stock),
            other => Err(DataError::InvalidAssetClass(other.to_string())),
        }
    }
}

/// One daily OHLCV observation for an asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Trading date
    pub date: NaiveDate,
    /// Asset identifier (ticker)
    pub asset: String,
    /// Asset class
    pub asset_type: AssetClass,
    /// Opening price
    pub open: f64,
    /// Session high
    pub high: f64,
    /// Session low
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Traded volume
    pub volume: f64,
}

/// A raw news article before scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    /// Publication date
    pub date: NaiveDate,
    /// Headline
    pub title: String,
    /// Body, summary or description
    pub description: String,
    /// Source URL when known
    pub link: Option<String>,
    /// Publisher when known
    pub source: Option<String>,
}

impl NewsItem {
    /// Title and description joined, the text handed to scorers
    pub fn text(&self) -> String {
        if self.description.is_empty() {
            self.title.clone()
        } else {
            format!("{} {}", self.title, self.description)
        }
    }
}

/// Three-way sentiment label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    /// Score above the positive threshold
    Positive,
    /// Score inside the neutral band
    Neutral,
    /// Score below the negative threshold
    Negative,
}

impl SentimentLabel {
    /// Lowercase label
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(Self::Positive),
            "neutral" => Ok(Self::Neutral),
            "negative" => Ok(Self::Negative),
            other => Err(DataError::InvalidSentimentLabel(other.to_string())),
        }
    }
}

/// A scored article. Immutable once ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentEvent {
    /// Publication date
    pub date: NaiveDate,
    /// Text that was scored
    pub raw_text: String,
    /// Score in [-1, 1]
    pub sentiment_score: f64,
    /// Label derived from the score by the pipeline policy
    pub sentiment_label: SentimentLabel,
    /// Scorer confidence in [0, 1]
    pub confidence: f64,
    /// Asset identifiers mentioned in the text
    pub asset_mentions: BTreeSet<String>,
}

/// Daily search interest for one asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchInterestPoint {
    /// Observation date
    pub date: NaiveDate,
    /// Asset identifier
    pub asset: String,
    /// Interest index in [0, 100]
    pub interest: f64,
}
