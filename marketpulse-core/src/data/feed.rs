//! Raw upstream sample shapes, before normalization.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily equity row as delivered upstream. Any cell may be missing
/// (Yahoo reports nulls for halted or partial sessions).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityRow {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

/// Timestamped price sample (milliseconds since the Unix epoch, UTC).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceTick {
    pub timestamp_ms: i64,
    pub price: f64,
}

/// Timestamped volume sample, parallel to the price samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeTick {
    pub timestamp_ms: i64,
    pub volume: f64,
}

/// Irregularly sampled crypto market chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CryptoChart {
    pub prices: Vec<PriceTick>,
    pub volumes: Vec<VolumeTick>,
}

impl CryptoChart {
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}
