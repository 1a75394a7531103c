#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/pulse/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod dates;
pub mod error;
pub mod events;
pub mod mentions;
pub mod news;
pub mod prices;
pub mod scoring;
pub mod search;
pub mod types;

pub use error::{DataError, Result};
pub use mentions::MentionDetector;
pub use scoring::{
    FallbackScorer, KeywordScorer, ScoringError, SentimentPolicy, SentimentScore, SentimentScorer,
    score_news,
};
pub use types::{
    AssetClass, NewsItem, PricePoint, SearchInterestPoint, SentimentEvent, SentimentLabel,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
