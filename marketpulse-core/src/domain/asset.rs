//! Tracked assets.

use serde::{Deserialize, Serialize};

/// Which upstream feed shape an asset arrives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// Daily OHLCV rows (equity indices).
    Equity,
    /// Irregular price and volume ticks.
    Crypto,
}

/// A dashboard asset: display name plus the upstream identifier
/// (a ticker for equities, a coin id for crypto).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    pub name: String,
    pub id: String,
    pub kind: AssetKind,
}

impl Asset {
    pub fn equity(name: impl Into<String>, ticker: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: ticker.into(),
            kind: AssetKind::Equity,
        }
    }

    pub fn crypto(name: impl Into<String>, coin_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: coin_id.into(),
            kind: AssetKind::Crypto,
        }
    }

    /// The default set: three US indices and two cryptocurrencies.
    pub fn default_set() -> Vec<Asset> {
        vec![
            Asset::equity("S&P 500", "^GSPC"),
            Asset::equity("Dow Jones", "^DJI"),
            Asset::equity("Nasdaq", "^IXIC"),
            Asset::crypto("Bitcoin", "bitcoin"),
            Asset::crypto("Ethereum", "ethereum"),
        ]
    }

    /// Case-insensitive match against either the name or the id.
    pub fn matches(&self, query: &str) -> bool {
        self.name.eq_ignore_ascii_case(query) || self.id.eq_ignore_ascii_case(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_set_has_indices_and_crypto() {
        let assets = Asset::default_set();
        assert_eq!(assets.len(), 5);
        assert_eq!(
            assets.iter().filter(|a| a.kind == AssetKind::Crypto).count(),
            2
        );
        assert!(assets.iter().any(|a| a.id == "^GSPC"));
    }

    #[test]
    fn matches_name_or_id() {
        let btc = Asset::crypto("Bitcoin", "bitcoin");
        assert!(btc.matches("BITCOIN"));
        assert!(Asset::equity("S&P 500", "^GSPC").matches("^gspc"));
        assert!(!btc.matches("ethereum"));
    }

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_string(&AssetKind::Crypto).unwrap();
        assert_eq!(json, "\"crypto\"");
    }
}
