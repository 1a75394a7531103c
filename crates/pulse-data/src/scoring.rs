//! Sentiment scoring contract and the keyword scorer.
//!
//! A scorer maps text to a score in [-1, 1] with a confidence. The label is
//! never chosen by the scorer: [`SentimentPolicy`] thresholds the score the
//! same way whichever scorer produced it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, warn};

use crate::mentions::MentionDetector;
use crate::types::{NewsItem, SentimentEvent, SentimentLabel};

/// Positive market vocabulary
pub const POSITIVE_KEYWORDS: &[&str] = &[
    "hausse",
    "progression",
    "rebond",
    "optimisme",
    "croissance",
    "record",
    "succès",
    "performance",
    "dynamique",
    "confiance",
];

/// Negative market vocabulary
pub const NEGATIVE_KEYWORDS: &[&str] = &[
    "baisse",
    "chute",
    "recul",
    "inquiétude",
    "crise",
    "correction",
    "volatilité",
    "incertitude",
    "panique",
    "ralentissement",
];

/// Confidence reported for keyword scores
pub const KEYWORD_CONFIDENCE: f64 = 0.6;

/// Confidence reported when a record fell back to keywords after a scorer error
pub const FALLBACK_CONFIDENCE: f64 = 0.5;

/// Failure of a scorer on a single text
#[derive(Debug, Error)]
pub enum ScoringError {
    /// Scorer could not process the text
    #[error("Scorer '{scorer}' failed: {reason}")]
    Failed {
        /// Scorer name
        scorer: String,
        /// Failure reason
        reason: String,
    },

    /// Scorer returned a score outside [-1, 1]
    #[error("Score {0} outside [-1, 1]")]
    OutOfRange(f64),
}

/// Raw scorer output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    /// Score in [-1, 1]
    pub score: f64,
    /// Confidence in [0, 1]
    pub confidence: f64,
}

/// Text to sentiment score
pub trait SentimentScorer {
    /// Scorer name for logs
    fn name(&self) -> &str;

    /// Score a single text
    fn score(&self, text: &str) -> Result<SentimentScore, ScoringError>;
}

/// Label thresholds applied to every score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentPolicy {
    /// Scores strictly above are positive (default: 0.2)
    pub positive_threshold: f64,
    /// Scores strictly below are negative (default: -0.2)
    pub negative_threshold: f64,
}

impl Default for SentimentPolicy {
    fn default() -> Self {
        Self {
            positive_threshold: 0.2,
            negative_threshold: -0.2,
        }
    }
}

impl SentimentPolicy {
    /// Label for a score
    pub fn label(&self, score: f64) -> SentimentLabel {
        if score > self.positive_threshold {
            SentimentLabel::Positive
        } else if score < self.negative_threshold {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

/// Keyword count scorer: `(positive − negative) / (positive + negative)`.
///
/// Counts every occurrence of every keyword in the lowercased text. Texts
/// without any keyword score 0.
#[derive(Debug, Clone)]
pub struct KeywordScorer {
    positive: Vec<String>,
    negative: Vec<String>,
}

impl Default for KeywordScorer {
    fn default() -> Self {
        Self::new(POSITIVE_KEYWORDS, NEGATIVE_KEYWORDS)
    }
}

impl KeywordScorer {
    /// Scorer over custom vocabularies
    pub fn new(positive: &[&str], negative: &[&str]) -> Self {
        Self {
            positive: positive.iter().map(|w| w.to_lowercase()).collect(),
            negative: negative.iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    /// Keyword score for a text, never fails
    pub fn keyword_score(&self, text: &str) -> f64 {
        let text = text.to_lowercase();
        let count = |words: &[String]| -> usize {
            words.iter().map(|w| text.matches(w.as_str()).count()).sum()
        };
        let pos = count(&self.positive) as f64;
        let neg = count(&self.negative) as f64;
        let total = pos + neg;
        if total == 0.0 { 0.0 } else { (pos - neg) / total }
    }
}

impl SentimentScorer for KeywordScorer {
    fn name(&self) -> &str {
        "keyword"
    }

    fn score(&self, text: &str) -> Result<SentimentScore, ScoringError> {
        Ok(SentimentScore {
            score: self.keyword_score(text),
            confidence: KEYWORD_CONFIDENCE,
        })
    }
}

/// Wraps a scorer and falls back to keywords for records it fails on
#[derive(Debug, Clone)]
pub struct FallbackScorer<S> {
    primary: S,
    fallback: KeywordScorer,
}

impl<S: SentimentScorer> FallbackScorer<S> {
    /// Wrap `primary` with the default keyword fallback
    pub fn new(primary: S) -> Self {
        Self {
            primary,
            fallback: KeywordScorer::default(),
        }
    }

    /// Score a text, never failing
    pub fn score_or_fallback(&self, text: &str) -> SentimentScore {
        let attempt = self.primary.score(text).and_then(|s| {
            if (-1.0..=1.0).contains(&s.score) {
                Ok(s)
            } else {
                Err(ScoringError::OutOfRange(s.score))
            }
        });
        match attempt {
            Ok(score) => score,
            Err(e) => {
                warn!(scorer = self.primary.name(), error = %e, "scorer failed, using keyword fallback");
                SentimentScore {
                    score: self.fallback.keyword_score(text),
                    confidence: FALLBACK_CONFIDENCE,
                }
            }
        }
    }
}

impl<S: SentimentScorer> SentimentScorer for FallbackScorer<S> {
    fn name(&self) -> &str {
        self.primary.name()
    }

    fn score(&self, text: &str) -> Result<SentimentScore, ScoringError> {
        Ok(self.score_or_fallback(text))
    }
}

/// Score news into sentiment events.
///
/// Scorer failures fall back to keywords per record; labels come from
/// `policy`; mentions from `detector` when given.
pub fn score_news<S: SentimentScorer + ?Sized>(
    news: &[NewsItem],
    scorer: &S,
    policy: &SentimentPolicy,
    detector: Option<&MentionDetector>,
) -> Vec<SentimentEvent> {
    let scorer = FallbackScorer::new(scorer);
    let events: Vec<SentimentEvent> = news
        .iter()
        .map(|item| {
            let text = item.text();
            let score = scorer.score_or_fallback(&text);
            let sentiment_score = score.score.clamp(-1.0, 1.0);
            SentimentEvent {
                date: item.date,
                asset_mentions: detector
                    .map(|d| d.detect(&text))
                    .unwrap_or_else(BTreeSet::new),
                sentiment_label: policy.label(sentiment_score),
                sentiment_score,
                confidence: score.confidence,
                raw_text: text,
            }
        })
        .collect();
    debug!(events = events.len(), "scored news");
    events
}

impl<S: SentimentScorer + ?Sized> SentimentScorer for &S {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn score(&self, text: &str) -> Result<SentimentScore, ScoringError> {
        (**self).score(text)
    }
}
