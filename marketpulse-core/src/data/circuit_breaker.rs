//! Per-provider circuit breaker.
//!
//! A ban response (HTTP 403) opens it at once; otherwise it opens after
//! `failure_threshold` failures in a row. An open breaker refuses requests
//! until `cooldown` has passed, then closes with a clean failure count.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct Tally {
    failures_in_a_row: u32,
    opened_at: Option<Instant>,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    provider: String,
    cooldown: Duration,
    failure_threshold: u32,
    tally: Mutex<Tally>,
}

impl CircuitBreaker {
    pub fn new(provider: impl Into<String>, cooldown: Duration) -> Self {
        Self {
            provider: provider.into(),
            cooldown,
            failure_threshold: 3,
            tally: Mutex::new(Tally::default()),
        }
    }

    /// Ten minutes, i.e. two market-data cache lifetimes.
    pub fn default_provider(provider: impl Into<String>) -> Self {
        Self::new(provider, Duration::from_secs(600))
    }

    fn tally(&self) -> MutexGuard<'_, Tally> {
        self.tally.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a request may go out now. Closes an expired breaker.
    pub fn is_allowed(&self) -> bool {
        let mut tally = self.tally();
        let Some(opened_at) = tally.opened_at else {
            return true;
        };
        if opened_at.elapsed() < self.cooldown {
            return false;
        }
        tracing::info!(provider = %self.provider, "breaker closed after cooldown");
        *tally = Tally::default();
        true
    }

    pub fn record_success(&self) {
        self.tally().failures_in_a_row = 0;
    }

    pub fn record_failure(&self) {
        let mut tally = self.tally();
        tally.failures_in_a_row += 1;
        if tally.opened_at.is_none() && tally.failures_in_a_row >= self.failure_threshold {
            tracing::warn!(
                provider = %self.provider,
                failures = tally.failures_in_a_row,
                "breaker opened"
            );
            tally.opened_at = Some(Instant::now());
        }
    }

    /// Open immediately, e.g. on a ban.
    pub fn trip(&self) {
        tracing::warn!(provider = %self.provider, "breaker opened by ban response");
        self.tally().opened_at = Some(Instant::now());
    }

    pub fn remaining_cooldown(&self) -> Duration {
        self.tally()
            .opened_at
            .map_or(Duration::ZERO, |at| self.cooldown.saturating_sub(at.elapsed()))
    }
}
