//! Structured errors for upstream data retrieval.
//!
//! Normalization never fails; these errors only describe why a fetch did not
//! produce raw samples. They are displayable as-is in the CLI.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("provider '{provider}' is blocked for {remaining_secs}s (circuit breaker tripped)")]
    CircuitBreakerTripped {
        provider: String,
        remaining_secs: u64,
    },

    #[error("csv import failed for {path}: {reason}")]
    Csv { path: String, reason: String },

    #[error("data error: {0}")]
    Other(String),
}
