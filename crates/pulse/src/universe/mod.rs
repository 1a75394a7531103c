//! Asset universe.
//!
//! The universe names the tracked assets, their class and the keywords used
//! to attribute news articles and search queries to them.

pub mod assets;

pub use assets::{AssetSpec, DefaultUniverse};

use pulse_data::{AssetClass, MentionDetector};

/// Trait for asset universes.
pub trait Universe {
    /// Get all asset specifications.
    fn assets(&self) -> &[AssetSpec];

    /// Get all symbols in the universe.
    fn symbols(&self) -> Vec<String> {
        self.assets().iter().map(|a| a.symbol.clone()).collect()
    }

    /// Check if a symbol is in the universe.
    fn contains(&self, symbol: &str) -> bool {
        self.assets().iter().any(|a| a.symbol == symbol)
    }

    /// Get the number of assets.
    fn size(&self) -> usize {
        self.assets().len()
    }

    /// Asset class of a symbol
    fn class_of(&self, symbol: &str) -> Option<AssetClass> {
        self.assets()
            .iter()
            .find(|a| a.symbol == symbol)
            .map(|a| a.class)
    }

    /// Symbols of one asset class
    fn symbols_in_class(&self, class: AssetClass) -> Vec<String> {
        self.assets()
            .iter()
            .filter(|a| a.class == class)
            .map(|a| a.symbol.clone())
            .collect()
    }

    /// Detector attributing articles to assets by their mention keywords
    fn mention_detector(&self) -> MentionDetector {
        MentionDetector::new(
            self.assets()
                .iter()
                .map(|a| (a.symbol.clone(), a.mention_keywords.clone())),
        )
    }
}

impl Universe for DefaultUniverse {
    fn assets(&self) -> &[AssetSpec] {
        self.assets()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("BTC", Some(AssetClass::Crypto))]
    #[case("ETH", Some(AssetClass::Crypto))]
    #[case("TTE.PA", Some(AssetClass::Stock))]
    #[case("AAPL", None)]
    fn test_class_of(#[case] symbol: &str, #[case] expected: Option<AssetClass>) {
        assert_eq!(DefaultUniverse::new().class_of(symbol), expected);
    }

    #[test]
    fn test_universe_trait() {
        let universe = DefaultUniverse::new();

        assert!(universe.contains("BTC"));
        assert!(!universe.contains("NOTREAL"));
        assert_eq!(universe.size(), 10);
        assert_eq!(universe.class_of("MC.PA"), Some(AssetClass::Stock));
        assert_eq!(universe.symbols_in_class(AssetClass::Crypto), vec!["BTC", "ETH"]);
    }

    #[test]
    fn test_mention_detector_from_universe() {
        let detector = DefaultUniverse::new().mention_detector();
        assert_eq!(detector.len(), 10);

        let mentions = detector.detect("Bitcoin et Ethereum en hausse");
        assert!(mentions.contains("BTC"));
        assert!(mentions.contains("ETH"));
        assert!(!mentions.contains("BNP.PA"));

        let mentions = detector.detect("Résultats de BNP Paribas");
        assert!(mentions.contains("BNP.PA"));
    }
}
