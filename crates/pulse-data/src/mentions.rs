//! Asset mention detection.

use std::collections::{BTreeMap, BTreeSet};

/// Finds which assets an article talks about.
///
/// Matching is a case-insensitive substring search of each asset's keywords.
#[derive(Debug, Clone, Default)]
pub struct MentionDetector {
    keywords: BTreeMap<String, Vec<String>>,
}

impl MentionDetector {
    /// Detector over `(asset, keywords)` pairs
    pub fn new<I, A, K>(assets: I) -> Self
    where
        I: IntoIterator<Item = (A, K)>,
        A: Into<String>,
        K: IntoIterator,
        K::Item: AsRef<str>,
    {
        let keywords = assets
            .into_iter()
            .map(|(asset, words)| {
                let words = words
                    .into_iter()
                    .map(|w| w.as_ref().to_lowercase())
                    .filter(|w| !w.is_empty())
                    .collect();
                (asset.into(), words)
            })
            .collect();
        Self { keywords }
    }

    /// Assets whose keywords occur in `text`
    pub fn detect(&self, text: &str) -> BTreeSet<String> {
        let text = text.to_lowercase();
        self.keywords
            .iter()
            .filter(|(_, words)| words.iter().any(|w| text.contains(w.as_str())))
            .map(|(asset, _)| asset.clone())
            .collect()
    }

    /// Number of assets tracked
    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    /// Whether no asset is tracked
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}
