//! Upstream feeds and the Bar Normalizer

pub mod circuit_breaker;
pub mod coingecko;
pub mod csv_import;
pub mod error;
pub mod feed;
pub mod http;
pub mod normalize;
pub mod provider;
pub mod yahoo;

pub use circuit_breaker::CircuitBreaker;
pub use coingecko::CoinGeckoProvider;
pub use csv_import::{read_equity_csv, CsvEquityProvider};
pub use error::DataError;
pub use feed::{CryptoChart, EquityRow, PriceTick, VolumeTick};
pub use normalize::{normalize_crypto, normalize_equity};
pub use provider::{CryptoProvider, EquityProvider};
pub use yahoo::YahooProvider;
