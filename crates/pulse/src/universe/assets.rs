//! Default universe: two crypto assets and eight Paris-listed stocks.

use pulse_data::AssetClass;
use std::collections::HashMap;

/// A tracked asset with its keyword lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSpec {
    /// Asset symbol.
    pub symbol: String,
    /// Asset class.
    pub class: AssetClass,
    /// Lowercase keywords marking a news mention
    pub mention_keywords: Vec<String>,
    /// Search queries whose interest is attributed to the asset
    pub search_keywords: Vec<String>,
}

impl AssetSpec {
    /// Create a new asset specification.
    pub fn new(
        symbol: impl Into<String>,
        class: AssetClass,
        mention_keywords: &[&str],
        search_keywords: &[&str],
    ) -> Self {
        Self {
            symbol: symbol.into(),
            class,
            mention_keywords: mention_keywords.iter().map(|k| k.to_string()).collect(),
            search_keywords: search_keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// The built-in asset universe.
#[derive(Debug, Clone)]
pub struct DefaultUniverse {
    assets: Vec<AssetSpec>,
    by_symbol: HashMap<String, usize>,
}

impl DefaultUniverse {
    /// Create the universe with the default assets.
    pub fn new() -> Self {
        Self::from_assets(Self::default_assets())
    }

    /// Universe over an explicit asset list
    pub fn from_assets(assets: Vec<AssetSpec>) -> Self {
        let by_symbol = assets
            .iter()
            .enumerate()
            .map(|(i, a)| (a.symbol.clone(), i))
            .collect();
        Self { assets, by_symbol }
    }

    /// Get all assets.
    pub fn assets(&self) -> &[AssetSpec] {
        &self.assets
    }

    /// Look up one asset.
    pub fn get(&self, symbol: &str) -> Option<&AssetSpec> {
        self.by_symbol.get(symbol).map(|i| &self.assets[*i])
    }

    /// Search keyword lists keyed by symbol
    pub fn search_keywords(&self) -> HashMap<String, Vec<String>> {
        self.assets
            .iter()
            .map(|a| (a.symbol.clone(), a.search_keywords.clone()))
            .collect()
    }

    fn default_assets() -> Vec<AssetSpec> {
        use AssetClass::{Crypto, Stock};
        vec![
            AssetSpec::new(
                "BTC",
                Crypto,
                &["bitcoin", "btc", "crypto", "cryptomonnaie"],
                &["bitcoin", "btc"],
            ),
            AssetSpec::new(
                "ETH",
                Crypto,
                &["ethereum", "eth", "ether"],
                &["ethereum", "eth"],
            ),
            AssetSpec::new(
                "MC.PA",
                Stock,
                &["lvmh", "louis vuitton", "luxe"],
                &["lvmh", "louis vuitton"],
            ),
            AssetSpec::new("RMS.PA", Stock, &["hermès", "hermes"], &["hermès", "hermes"]),
            AssetSpec::new(
                "TTE.PA",
                Stock,
                &["totalenergies", "total", "énergie", "pétrole"],
                &["totalenergies", "total energie"],
            ),
            AssetSpec::new("ENGI.PA", Stock, &["engie", "gaz", "électricité"], &["engie"]),
            AssetSpec::new(
                "BNP.PA",
                Stock,
                &["bnp", "bnp paribas", "banque"],
                &["bnp paribas", "bnp"],
            ),
            AssetSpec::new(
                "GLE.PA",
                Stock,
                &["société générale", "socgen", "societe generale"],
                &["société générale", "socgen"],
            ),
            AssetSpec::new(
                "CAP.PA",
                Stock,
                &["capgemini", "tech", "technologie"],
                &["capgemini"],
            ),
            AssetSpec::new(
                "SU.PA",
                Stock,
                &["schneider", "schneider electric", "industrie"],
                &["schneider electric"],
            ),
        ]
    }
}

impl Default for DefaultUniverse {
    fn default() -> Self {
        Self::new()
    }
}
