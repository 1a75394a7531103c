//! Persisted sentiment events (`sentiment_scores.csv`).
//!
//! Mentions are stored `;`-separated in a single column.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::dates::{format_date, parse_date};
use crate::types::SentimentEvent;
use crate::{DataError, Result};

#[derive(Debug, Serialize, Deserialize)]
struct EventRecord {
    date: String,
    sentiment_score: f64,
    sentiment_label: String,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    asset_mentions: String,
    #[serde(default)]
    text: String,
}

impl From<&SentimentEvent> for EventRecord {
    fn from(event: &SentimentEvent) -> Self {
        Self {
            date: format_date(event.date),
            sentiment_score: event.sentiment_score,
            sentiment_label: event.sentiment_label.to_string(),
            confidence: Some(event.confidence),
            asset_mentions: event
                .asset_mentions
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(";"),
            text: event.raw_text.clone(),
        }
    }
}

impl TryFrom<EventRecord> for SentimentEvent {
    type Error = DataError;

    fn try_from(record: EventRecord) -> Result<Self> {
        Ok(Self {
            date: parse_date(&record.date)?,
            sentiment_score: record.sentiment_score.clamp(-1.0, 1.0),
            sentiment_label: record.sentiment_label.parse()?,
            confidence: record.confidence.unwrap_or(0.0),
            asset_mentions: record
                .asset_mentions
                .split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            raw_text: record.text,
        })
    }
}

/// Write events to CSV
pub fn write_events(path: &Path, events: &[SentimentEvent]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    for event in events {
        writer.serialize(EventRecord::from(event))?;
    }
    writer.flush()?;
    info!(path = %path.display(), events = events.len(), "wrote sentiment events");
    Ok(())
}

/// Read events previously written by [`write_events`] or an external scorer.
///
/// Records with an unparseable date or label are skipped.
pub fn read_events(path: &Path) -> Result<Vec<SentimentEvent>> {
    if !path.exists() {
        return Err(DataError::MissingInput {
            path: path.to_path_buf(),
        });
    }

    let mut reader = csv::Reader::from_path(path)?;
    let mut events = Vec::new();
    let mut skipped = 0usize;
    for record in reader.deserialize::<EventRecord>() {
        match SentimentEvent::try_from(record?) {
            Ok(event) => events.push(event),
            Err(_) => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(path = %path.display(), skipped, "skipped invalid sentiment events");
    }
    Ok(events)
}
