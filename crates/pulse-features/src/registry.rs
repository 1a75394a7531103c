//! Feature Catalog
//!
//! Central list of every column the pipeline produces for a configuration,
//! in output order and tagged by category. The finalizer orders columns
//! with it and the dataset summary counts features per category.

use std::collections::HashMap;

use crate::composer::{LagColumns, cross_section, engineered};
use crate::config::PipelineConfig;
use crate::indicators::IndicatorEngine;
use crate::labels::LabelGenerator;

/// Identifier columns leading every row
pub const META_COLUMNS: [&str; 3] = ["date", "asset", "asset_type"];

/// Price and volume columns following the identifiers
pub const PRICE_COLUMNS: [&str; 5] = ["open", "high", "low", "close", "volume"];

/// Available feature categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureCategory {
    /// OHLCV fields
    Price,
    /// Indicator engine outputs
    Technical,
    /// Market sentiment lag windows
    Sentiment,
    /// Search-interest lag windows
    SearchInterest,
    /// Interaction, regime and composite features
    Engineered,
    /// Forward returns and directions
    Target,
}

impl FeatureCategory {
    /// Snake-case name
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::Technical => "technical",
            Self::Sentiment => "sentiment",
            Self::SearchInterest => "search_interest",
            Self::Engineered => "engineered",
            Self::Target => "target",
        }
    }
}

/// Feature metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureInfo {
    /// Column name
    pub name: String,
    /// Category
    pub category: FeatureCategory,
}

/// Ordered catalog of produced columns, identifiers excluded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureCatalog {
    features: Vec<FeatureInfo>,
}

impl FeatureCatalog {
    /// Catalog of every column produced with `config`
    pub fn for_config(config: &PipelineConfig) -> Self {
        let lag = LagColumns::new(&config.lag_window);
        let mut engineered_names = engineered::column_names(config);
        engineered_names.extend(cross_section::column_names());

        let groups: [(FeatureCategory, Vec<String>); 6] = [
            (
                FeatureCategory::Price,
                PRICE_COLUMNS.map(String::from).to_vec(),
            ),
            (
                FeatureCategory::Technical,
                IndicatorEngine::with_config(config.indicators.clone()).column_names(),
            ),
            (FeatureCategory::Sentiment, lag.sentiment()),
            (FeatureCategory::SearchInterest, lag.trends()),
            (FeatureCategory::Engineered, engineered_names),
            (
                FeatureCategory::Target,
                LabelGenerator::with_config(config.labels.clone()).column_names(),
            ),
        ];

        let features = groups
            .into_iter()
            .flat_map(|(category, names)| {
                names
                    .into_iter()
                    .map(move |name| FeatureInfo { name, category })
            })
            .collect();
        Self { features }
    }

    /// All entries in output order
    pub fn features(&self) -> &[FeatureInfo] {
        &self.features
    }

    /// Entries of one category
    pub fn by_category(&self, category: FeatureCategory) -> impl Iterator<Item = &FeatureInfo> {
        self.features.iter().filter(move |f| f.category == category)
    }

    /// Names of one category
    pub fn names(&self, category: FeatureCategory) -> Vec<&str> {
        self.by_category(category).map(|f| f.name.as_str()).collect()
    }

    /// Model input columns: everything except prices and targets
    pub fn feature_names(&self) -> Vec<&str> {
        self.features
            .iter()
            .filter(|f| !matches!(f.category, FeatureCategory::Price | FeatureCategory::Target))
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Look up a column
    pub fn get(&self, name: &str) -> Option<&FeatureInfo> {
        self.features.iter().find(|f| f.name == name)
    }

    /// Number of columns per category
    pub fn count_by_category(&self) -> HashMap<FeatureCategory, usize> {
        let mut counts = HashMap::new();
        for feature in &self.features {
            *counts.entry(feature.category).or_insert(0) += 1;
        }
        counts
    }

    /// Total number of cataloged columns
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order() {
        let catalog = FeatureCatalog::for_config(&PipelineConfig::default());
        let first = catalog.features().first().unwrap();
        assert_eq!(first.name, "open");
        let last = catalog.features().last().unwrap();
        assert_eq!(last.name, "target_direction_14d");
        assert_eq!(last.category, FeatureCategory::Target);
    }

    #[test]
    fn test_lookup_and_categories() {
        let catalog = FeatureCatalog::for_config(&PipelineConfig::default());
        assert_eq!(
            catalog.get("rsi").map(|f| f.category),
            Some(FeatureCategory::Technical)
        );
        assert_eq!(
            catalog.get("trends_interest_mean_7d").map(|f| f.category),
            Some(FeatureCategory::SearchInterest)
        );
        assert_eq!(
            catalog.get("sentiment_stress_high").map(|f| f.category),
            Some(FeatureCategory::Engineered)
        );
        assert!(catalog.get("nonexistent_feature").is_none());
    }

    #[test]
    fn test_count_by_category() {
        let catalog = FeatureCatalog::for_config(&PipelineConfig::default());
        let counts = catalog.count_by_category();
        assert_eq!(counts.get(&FeatureCategory::Price), Some(&5));
        assert_eq!(counts.get(&FeatureCategory::Sentiment), Some(&9));
        assert_eq!(counts.get(&FeatureCategory::SearchInterest), Some(&7));
        assert_eq!(counts.get(&FeatureCategory::Target), Some(&6));
        assert_eq!(counts.values().sum::<usize>(), catalog.len());
    }

    #[test]
    fn test_names_are_unique() {
        let catalog = FeatureCatalog::for_config(&PipelineConfig::default());
        let mut names: Vec<&str> = catalog.features().iter().map(|f| f.name.as_str()).collect();
        names.sort_unstable();
        let before = names.len();
        names.dedup();
        assert_eq!(names.len(), before);
    }

    #[test]
    fn test_feature_names_exclude_prices_and_targets() {
        let catalog = FeatureCatalog::for_config(&PipelineConfig::default());
        let names = catalog.feature_names();
        assert!(!names.contains(&"close"));
        assert!(!names.contains(&"target_return_3d"));
        assert!(names.contains(&"market_position"));
    }
}
