//! Yahoo Finance equity provider.
//!
//! Fetches daily OHLCV rows from the unofficial v8 chart API. The response
//! format can change without notice; parse failures surface as
//! `DataError::ResponseFormatChanged` and the CSV provider is the fallback.

use super::circuit_breaker::CircuitBreaker;
use super::error::DataError;
use super::feed::EquityRow;
use super::http::HttpFetcher;
use super::provider::EquityProvider;
use serde::Deserialize;
use std::sync::Arc;

const CHART_BASE: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

pub struct YahooProvider {
    http: HttpFetcher,
}

impl YahooProvider {
    pub fn new(breaker: Arc<CircuitBreaker>) -> Result<Self, DataError> {
        Ok(Self {
            http: HttpFetcher::new("yahoo_finance", breaker)?,
        })
    }

    fn chart_url(ticker: &str) -> String {
        format!("{CHART_BASE}/{}", ticker.replace('^', "%5E"))
    }

    fn parse_response(ticker: &str, resp: ChartResponse) -> Result<Vec<EquityRow>, DataError> {
        let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
            Some(err) if err.code == "Not Found" => DataError::SymbolNotFound {
                symbol: ticker.to_string(),
            },
            Some(err) => {
                DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
            }
            None => DataError::ResponseFormatChanged("empty result with no error".into()),
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

        // No timestamps: the range holds no sessions. Not an error, just no rows.
        let Some(timestamps) = data.timestamp else {
            return Ok(Vec::new());
        };

        let quote = data.indicators.quote.into_iter().next().unwrap_or_default();
        let cell = |v: &Vec<Option<f64>>, i: usize| v.get(i).copied().flatten();

        let mut rows = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.date_naive())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;

            let row = EquityRow {
                date,
                open: cell(&quote.open, i),
                high: cell(&quote.high, i),
                low: cell(&quote.low, i),
                close: cell(&quote.close, i),
                volume: cell(&quote.volume, i),
            };

            // All-null rows are non-trading placeholders, not malformed data
            if row.open.is_none() && row.high.is_none() && row.low.is_none() && row.close.is_none() {
                continue;
            }
            rows.push(row);
        }

        Ok(rows)
    }
}

impl EquityProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch_daily(&self, ticker: &str, days: u32) -> Result<Vec<EquityRow>, DataError> {
        let query = [
            ("range", format!("{days}d")),
            ("interval", "1d".to_string()),
        ];
        let resp: ChartResponse = self.http.get_json(&Self::chart_url(ticker), &query, ticker)?;
        let rows = Self::parse_response(ticker, resp)?;
        tracing::debug!(ticker, rows = rows.len(), "fetched yahoo chart");
        Ok(rows)
    }
}
