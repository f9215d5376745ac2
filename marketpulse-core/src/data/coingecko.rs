//! CoinGecko crypto provider (`/coins/{id}/market_chart`).
//!
//! Sampling granularity depends on the requested span (5-minute, hourly or
//! daily); the normalizer resamples whatever arrives to daily bars.

use super::circuit_breaker::CircuitBreaker;
use super::error::DataError;
use super::feed::{CryptoChart, PriceTick, VolumeTick};
use super::http::HttpFetcher;
use super::provider::CryptoProvider;
use serde::Deserialize;
use std::sync::Arc;

const API_BASE: &str = "https://api.coingecko.com/api/v3";

#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    #[serde(default)]
    prices: Vec<[f64; 2]>,
    #[serde(default)]
    total_volumes: Vec<[f64; 2]>,
}

pub struct CoinGeckoProvider {
    http: HttpFetcher,
    vs_currency: String,
}

impl CoinGeckoProvider {
    pub fn new(breaker: Arc<CircuitBreaker>) -> Result<Self, DataError> {
        Ok(Self {
            http: HttpFetcher::new("coingecko", breaker)?,
            vs_currency: "usd".to_string(),
        })
    }

    fn into_chart(resp: MarketChartResponse) -> CryptoChart {
        CryptoChart {
            prices: resp
                .prices
                .into_iter()
                .map(|[ts, price]| PriceTick {
                    timestamp_ms: ts as i64,
                    price,
                })
                .collect(),
            volumes: resp
                .total_volumes
                .into_iter()
                .map(|[ts, volume]| VolumeTick {
                    timestamp_ms: ts as i64,
                    volume,
                })
                .collect(),
        }
    }
}

impl CryptoProvider for CoinGeckoProvider {
    fn name(&self) -> &str {
        "coingecko"
    }

    fn fetch_market_chart(&self, coin_id: &str, days: u32) -> Result<CryptoChart, DataError> {
        let url = format!("{API_BASE}/coins/{coin_id}/market_chart");
        let query = [
            ("vs_currency", self.vs_currency.clone()),
            ("days", days.to_string()),
        ];
        let resp: MarketChartResponse = self.http.get_json(&url, &query, coin_id)?;
        let chart = Self::into_chart(resp);
        tracing::debug!(coin_id, ticks = chart.prices.len(), "fetched coingecko market chart");
        Ok(chart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_price_and_volume_pairs() {
        let json = r#"{"prices":[[1704067200000,42283.58],[1704070800000,42411.1]],
            "market_caps":[[1704067200000,8.28e11]],
            "total_volumes":[[1704067200000,1.4e10],[1704070800000,1.39e10]]}"#;
        let resp: MarketChartResponse = serde_json::from_str(json).unwrap();
        let chart = CoinGeckoProvider::into_chart(resp);
        assert_eq!(chart.prices.len(), 2);
        assert_eq!(chart.prices[1].timestamp_ms, 1_704_070_800_000);
        assert_eq!(chart.volumes[0].volume, 1.4e10);
    }

    #[test]
    fn missing_arrays_are_empty() {
        let resp: MarketChartResponse = serde_json::from_str("{}").unwrap();
        assert!(CoinGeckoProvider::into_chart(resp).is_empty());
    }
}
