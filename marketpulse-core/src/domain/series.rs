//! Canonical bar sequence and date-aligned derived series.

use super::bar::Bar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Ordered, de-duplicated sequence of valid daily bars for one asset.
///
/// Dates are strictly increasing. Missing days are absent, never zero-filled.
/// Once built the series is never mutated; transforms derive new values from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Canonicalize `bars` into a series: drop invalid bars, sort by date
    /// (stable), and keep the first bar for any duplicated date.
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Self {
        let symbol = symbol.into();
        let mut kept: Vec<Bar> = bars
            .into_iter()
            .filter(|bar| match bar.validate() {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(symbol = %symbol, date = %bar.date, error = %e, "dropping invalid bar");
                    false
                }
            })
            .collect();

        kept.sort_by_key(|b| b.date);
        let before = kept.len();
        kept.dedup_by_key(|b| b.date);
        if kept.len() < before {
            tracing::warn!(
                symbol = %symbol,
                duplicates = before - kept.len(),
                "dropping bars with duplicate dates"
            );
        }

        Self { symbol, bars: kept }
    }

    /// An empty series: "data unavailable for this asset".
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bars: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// New series holding only the last `n` bars.
    pub fn tail(&self, n: usize) -> Self {
        let start = self.bars.len().saturating_sub(n);
        Self {
            symbol: self.symbol.clone(),
            bars: self.bars[start..].to_vec(),
        }
    }
}

/// A named column aligned to a `BarSeries` date index.
///
/// `values[i]` belongs to `dates[i]`; `None` marks a date where the
/// indicator's window requirement is not met.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedSeries {
    name: String,
    dates: Vec<NaiveDate>,
    values: Vec<Option<f64>>,
}

impl DerivedSeries {
    /// Build from a warmup-NaN vector as produced by the indicator kernels.
    /// Any non-finite value becomes absent.
    pub fn from_raw(name: impl Into<String>, bars: &[Bar], raw: Vec<f64>) -> Self {
        debug_assert_eq!(bars.len(), raw.len());
        Self {
            name: name.into(),
            dates: bars.iter().map(|b| b.date).collect(),
            values: raw
                .into_iter()
                .map(|v| if v.is_finite() { Some(v) } else { None })
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Value at `date`; `None` if the date is not in the index or the value is absent.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.dates
            .binary_search(&date)
            .ok()
            .and_then(|i| self.values[i])
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (NaiveDate, Option<f64>)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Only the dates that carry a value.
    pub fn defined(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.iter().filter_map(|(d, v)| v.map(|v| (d, v)))
    }

    pub fn last_defined(&self) -> Option<(NaiveDate, f64)> {
        self.iter().rev().find_map(|(d, v)| v.map(|v| (d, v)))
    }
}
