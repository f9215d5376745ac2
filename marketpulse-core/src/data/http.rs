//! Shared blocking JSON client for the market-data providers.
//!
//! Transient failures (429, 5xx, connect errors, timeouts) are retried with
//! doubling delays and counted against the provider's circuit breaker.

use super::circuit_breaker::CircuitBreaker;
use super::error::DataError;
use reqwest::blocking::Response;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// What one attempt produced.
enum Attempt<T> {
    Done(T),
    Retry(DataError),
}

pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    breaker: Arc<CircuitBreaker>,
    provider: String,
    max_retries: u32,
    base_delay: Duration,
}

impl HttpFetcher {
    pub fn new(provider: &str, breaker: Arc<CircuitBreaker>) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) marketpulse/0.1")
            .build()
            .map_err(|e| DataError::Other(format!("http client setup: {e}")))?;

        Ok(Self {
            client,
            breaker,
            provider: provider.to_string(),
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    fn blocked(&self) -> DataError {
        DataError::CircuitBreakerTripped {
            provider: self.provider.clone(),
            remaining_secs: self.breaker.remaining_cooldown().as_secs(),
        }
    }

    /// GET `url?query` and decode the body as `T`. `symbol` names the asset in errors.
    pub fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        symbol: &str,
    ) -> Result<T, DataError> {
        let mut last_error = DataError::Other(format!("no attempt made for {symbol}"));

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                tracing::debug!(provider = %self.provider, symbol, attempt, ?delay, "backing off");
                std::thread::sleep(delay);
            }
            if !self.breaker.is_allowed() {
                return Err(self.blocked());
            }

            let outcome = match self.client.get(url).query(query).send() {
                Ok(resp) => self.read_response(resp, symbol)?,
                Err(e) if e.is_connect() || e.is_timeout() => {
                    Attempt::Retry(DataError::NetworkUnreachable(e.to_string()))
                }
                Err(e) => return Err(DataError::NetworkUnreachable(e.to_string())),
            };

            match outcome {
                Attempt::Done(body) => {
                    self.breaker.record_success();
                    return Ok(body);
                }
                Attempt::Retry(err) => {
                    self.breaker.record_failure();
                    last_error = err;
                }
            }
        }

        Err(last_error)
    }

    /// Sorts a response into success, a retryable failure, or a final error.
    fn read_response<T: DeserializeOwned>(
        &self,
        resp: Response,
        symbol: &str,
    ) -> Result<Attempt<T>, DataError> {
        let status = resp.status();
        match status {
            StatusCode::FORBIDDEN => {
                self.breaker.trip();
                Err(self.blocked())
            }
            StatusCode::NOT_FOUND => Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            }),
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after_secs = resp
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60);
                Ok(Attempt::Retry(DataError::RateLimited { retry_after_secs }))
            }
            s if !s.is_success() => Ok(Attempt::Retry(DataError::Other(format!(
                "HTTP {s} for {symbol}"
            )))),
            _ => resp.json().map(Attempt::Done).map_err(|e| {
                DataError::ResponseFormatChanged(format!("{symbol}: {e}"))
            }),
        }
    }
}
