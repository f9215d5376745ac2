//! Upstream provider traits.
//!
//! Providers only fetch raw samples; normalization and caching sit above
//! them, so providers know nothing about either and are easy to mock.

use super::error::DataError;
use super::feed::{CryptoChart, EquityRow};

/// Source of daily equity OHLCV rows.
pub trait EquityProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Daily rows for `ticker` covering roughly the last `days` calendar days.
    fn fetch_daily(&self, ticker: &str, days: u32) -> Result<Vec<EquityRow>, DataError>;
}

/// Source of irregular crypto price/volume samples.
pub trait CryptoProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Price and volume ticks for `coin_id` over the last `days` days.
    fn fetch_market_chart(&self, coin_id: &str, days: u32) -> Result<CryptoChart, DataError>;
}
