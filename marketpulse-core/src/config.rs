//! Dashboard configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) gives the stock
//! dashboard: three US indices, Bitcoin and Ethereum over 30 days with
//! moving averages.

use crate::domain::Asset;
use crate::indicators::{IndicatorKind, IndicatorParams, IndicatorSet};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub days: u32,
    pub assets: Vec<Asset>,
    pub indicators: IndicatorSet,
    pub params: IndicatorParams,
    pub cache: CacheConfig,
    pub news: NewsConfig,
    pub summary: SummaryConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            days: 30,
            assets: Asset::default_set(),
            indicators: IndicatorSet::new([IndicatorKind::Sma]),
            params: IndicatorParams::default(),
            cache: CacheConfig::default(),
            news: NewsConfig::default(),
            summary: SummaryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub market_ttl_secs: u64,
    pub news_ttl_secs: u64,
    pub summary_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            market_ttl_secs: 300,
            news_ttl_secs: 3600,
            summary_ttl_secs: 1800,
        }
    }
}

impl CacheConfig {
    pub fn market_ttl(&self) -> Duration {
        Duration::from_secs(self.market_ttl_secs)
    }

    pub fn news_ttl(&self) -> Duration {
        Duration::from_secs(self.news_ttl_secs)
    }

    pub fn summary_ttl(&self) -> Duration {
        Duration::from_secs(self.summary_ttl_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    /// Pages whose text goes to the summarizer.
    pub summary_sources: Vec<String>,
    /// Pages scanned for keyword counts.
    pub keyword_sources: Vec<String>,
    pub keywords: Vec<String>,
    pub history_days: u32,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            summary_sources: vec![
                "https://finance.yahoo.com/topic/stock-market-news".into(),
                "https://www.marketwatch.com/latest-news".into(),
            ],
            keyword_sources: vec![
                "https://finance.yahoo.com/topic/stock-market-news".into(),
                "https://www.marketwatch.com/latest-news".into(),
                "https://www.cnbc.com/markets/".into(),
            ],
            keywords: [
                "inflation",
                "recession",
                "interest rate",
                "fed",
                "earnings",
                "volatility",
                "rally",
                "selloff",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            history_days: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    pub model: String,
    pub api_base: String,
    pub api_key_env: String,
    pub max_input_chars: usize,
    pub max_completion_tokens: u32,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            model: "gpt-5".into(),
            api_base: "https://api.openai.com/v1".into(),
            api_key_env: "OPENAI_API_KEY".into(),
            max_input_chars: 4000,
            max_completion_tokens: 500,
        }
    }
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject a zero look-back and parameters the indicator constructors would refuse.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.days == 0 {
            return Err(ConfigError::Invalid("days must be >= 1".into()));
        }
        self.params
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn find_asset(&self, query: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.matches(query))
    }
}

/// Chart look-back presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Timeframe {
    Week,
    Month,
    Quarter,
    HalfYear,
    Year,
}

impl Timeframe {
    pub fn days(&self) -> u32 {
        match self {
            Timeframe::Week => 7,
            Timeframe::Month => 30,
            Timeframe::Quarter => 90,
            Timeframe::HalfYear => 180,
            Timeframe::Year => 365,
        }
    }
}

impl FromStr for Timeframe {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1w" | "week" => Ok(Timeframe::Week),
            "1m" | "month" => Ok(Timeframe::Month),
            "3m" | "quarter" => Ok(Timeframe::Quarter),
            "6m" | "half-year" => Ok(Timeframe::HalfYear),
            "1y" | "year" => Ok(Timeframe::Year),
            other => Err(ConfigError::Invalid(format!(
                "unknown timeframe '{other}' (expected week, month, quarter, half-year, year)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AssetKind;

    #[test]
    fn empty_toml_is_default() {
        let config = DashboardConfig::from_toml("").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.assets.len(), 5);
        assert_eq!(config.params.sma_periods, vec![20, 50]);
        assert_eq!(config.cache.market_ttl(), Duration::from_secs(300));
    }

    #[test]
    fn parses_partial_overrides() {
        let config = DashboardConfig::from_toml(
            r#"
            days = 90
            indicators = ["sma", "bb", "rsi"]

            [[assets]]
            name = "Solana"
            id = "solana"
            kind = "crypto"

            [params]
            rsi_window = 7

            [cache]
            market_ttl_secs = 60
            "#,
        )
        .unwrap();
        assert_eq!(config.days, 90);
        assert_eq!(config.assets.len(), 1);
        assert_eq!(config.assets[0].kind, AssetKind::Crypto);
        assert!(config.indicators.contains(IndicatorKind::Bollinger));
        assert_eq!(config.params.rsi_window, 7);
        assert_eq!(config.params.bollinger_window, 20);
        assert_eq!(config.cache.news_ttl_secs, 3600);
    }

    #[test]
    fn rejects_zero_windows() {
        let err = DashboardConfig::from_toml("[params]\nrsi_window = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = DashboardConfig::from_toml("[params]\nsma_periods = [20, 0]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_inverted_macd() {
        let err = DashboardConfig::from_toml("[params]\nmacd_fast = 30\n").unwrap_err();
        assert!(err.to_string().contains("macd_fast"));
    }

    #[test]
    fn rejects_unknown_indicator() {
        assert!(matches!(
            DashboardConfig::from_toml(r#"indicators = ["vwap"]"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.toml");
        std::fs::write(&path, "days = 7\n").unwrap();
        assert_eq!(DashboardConfig::from_file(&path).unwrap().days, 7);
        assert!(matches!(
            DashboardConfig::from_file(&dir.path().join("missing.toml")),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn find_asset_by_name_or_id() {
        let config = DashboardConfig::default();
        assert_eq!(config.find_asset("nasdaq").map(|a| a.id.as_str()), Some("^IXIC"));
        assert!(config.find_asset("dogecoin").is_none());
    }

    #[test]
    fn timeframe_parsing() {
        assert_eq!("quarter".parse::<Timeframe>().unwrap().days(), 90);
        assert_eq!("1y".parse::<Timeframe>().unwrap(), Timeframe::Year);
        assert!("decade".parse::<Timeframe>().is_err());
    }
}
