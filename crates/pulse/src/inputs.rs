//! On-disk layout of pipeline inputs and outputs.

use polars::prelude::DataFrame;
use pulse_data::events::read_events;
use pulse_data::news::load_news_dir;
use pulse_data::prices::load_price_frame;
use pulse_data::search::load_search_interest;
use pulse_data::{
    AssetClass, DataError, KeywordScorer, MentionDetector, SearchInterestPoint, SentimentEvent,
    SentimentPolicy, score_news,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::Result;

/// Paths under a data directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    /// Layout rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Data directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Raw inputs directory, also scanned for news files
    pub fn raw_dir(&self) -> PathBuf {
        self.root.join("raw")
    }

    /// Derived outputs directory
    pub fn processed_dir(&self) -> PathBuf {
        self.root.join("processed")
    }

    /// Price file of one asset class
    pub fn prices(&self, class: AssetClass) -> PathBuf {
        let name = match class {
            AssetClass::Crypto => "prices_crypto.csv",
            AssetClass::Stock => "prices_stocks.csv",
        };
        self.raw_dir().join(name)
    }

    /// Search-interest file, preferring `search_interest.csv` over the legacy
    /// `google_trends.csv`
    pub fn search_interest(&self) -> PathBuf {
        let preferred = self.raw_dir().join("search_interest.csv");
        let legacy = self.raw_dir().join("google_trends.csv");
        if !preferred.exists() && legacy.exists() {
            legacy
        } else {
            preferred
        }
    }

    /// Scored sentiment events
    pub fn sentiment_scores(&self) -> PathBuf {
        self.processed_dir().join("sentiment_scores.csv")
    }

    /// Daily market sentiment
    pub fn market_sentiment(&self) -> PathBuf {
        self.processed_dir().join("market_sentiment.csv")
    }

    /// Price panel with indicators
    pub fn technical_features(&self) -> PathBuf {
        self.processed_dir().join("technical_features.csv")
    }

    /// Daily per-class indicator aggregates
    pub fn daily_aggregates(&self) -> PathBuf {
        self.processed_dir().join("daily_aggregates.csv")
    }

    /// Final training table
    pub fn features_final(&self) -> PathBuf {
        self.processed_dir().join("features_final.csv")
    }

    /// Head of the final table
    pub fn features_sample(&self) -> PathBuf {
        self.processed_dir().join("features_sample.csv")
    }

    /// Dataset statistics
    pub fn summary(&self) -> PathBuf {
        self.processed_dir().join("dataset_summary.json")
    }
}

/// Everything a pipeline run reads
#[derive(Debug, Clone, Default)]
pub struct PipelineInputs {
    /// One price table per asset class
    pub prices: Vec<DataFrame>,
    /// Scored news
    pub events: Vec<SentimentEvent>,
    /// Raw search-interest points
    pub search: Vec<SearchInterestPoint>,
}

impl PipelineInputs {
    /// Load every input under `layout`.
    ///
    /// Price files are required. Pre-scored events are used when present,
    /// otherwise raw news is scored with the keyword scorer. Missing news and
    /// search data yield empty inputs.
    pub fn load(
        layout: &DataLayout,
        policy: &SentimentPolicy,
        detector: &MentionDetector,
    ) -> Result<Self> {
        Ok(Self {
            prices: load_prices(layout)?,
            events: load_events(layout, policy, detector)?,
            search: optional(load_search_interest(&layout.search_interest()), "search interest")?,
        })
    }
}

/// Load both price files
pub fn load_prices(layout: &DataLayout) -> Result<Vec<DataFrame>> {
    AssetClass::all()
        .into_iter()
        .map(|class| Ok(load_price_frame(&layout.prices(class), class)?))
        .collect()
}

/// Read pre-scored events, or score the raw news
pub fn load_events(
    layout: &DataLayout,
    policy: &SentimentPolicy,
    detector: &MentionDetector,
) -> Result<Vec<SentimentEvent>> {
    let scored = layout.sentiment_scores();
    if scored.exists() {
        let events = read_events(&scored)?;
        info!(path = %scored.display(), events = events.len(), "using pre-scored sentiment");
        return Ok(events);
    }
    let news = load_news_dir(&layout.raw_dir())?;
    if news.is_empty() {
        warn!(dir = %layout.raw_dir().display(), "no news found, sentiment features will be neutral");
    }
    Ok(score_news(&news, &KeywordScorer::default(), policy, Some(detector)))
}

fn optional<T>(loaded: pulse_data::Result<Vec<T>>, what: &str) -> Result<Vec<T>> {
    match loaded {
        Ok(values) => Ok(values),
        Err(DataError::MissingInput { path }) => {
            warn!(path = %path.display(), "no {what} input, features will be neutral");
            Ok(Vec::new())
        }
        Err(e) => Err(e.into()),
    }
}
