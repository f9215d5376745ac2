//! Bar Normalizer: equity rows and crypto ticks into a canonical `BarSeries`.
//!
//! Neither function fails. Bad samples are dropped with a warning, and an
//! empty or entirely invalid feed produces an empty series, which callers
//! treat as "data unavailable".

use super::feed::{CryptoChart, EquityRow};
use crate::domain::{Bar, BarSeries};
use chrono::{DateTime, NaiveDate};
use std::collections::{BTreeMap, HashMap};

/// Daily equity rows → canonical series.
///
/// Rows with a missing cell are dropped here; invariant violations and
/// duplicate dates are dropped by `BarSeries::new`.
pub fn normalize_equity(symbol: &str, rows: &[EquityRow]) -> BarSeries {
    let bars: Vec<Bar> = rows
        .iter()
        .filter_map(|row| {
            let bar = match (row.open, row.high, row.low, row.close, row.volume) {
                (Some(open), Some(high), Some(low), Some(close), Some(volume)) => Bar {
                    date: row.date,
                    open,
                    high,
                    low,
                    close,
                    volume,
                },
                _ => {
                    tracing::warn!(symbol, date = %row.date, "dropping equity row with missing fields");
                    return None;
                }
            };
            Some(bar)
        })
        .collect();

    let series = BarSeries::new(symbol, bars);
    tracing::debug!(symbol, rows = rows.len(), bars = series.len(), "normalized equity rows");
    series
}

#[derive(Debug, Clone, Copy)]
struct DayAccumulator {
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl DayAccumulator {
    fn start(price: f64, volume: f64) -> Self {
        Self {
            open: price,
            high: price,
            low: price,
            close: price,
            volume,
        }
    }

    fn push(&mut self, price: f64, volume: f64) {
        self.high = self.high.max(price);
        self.low = self.low.min(price);
        self.close = price;
        self.volume += volume;
    }
}

fn utc_date(timestamp_ms: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(timestamp_ms).map(|dt| dt.date_naive())
}

/// Irregular crypto ticks → one bar per UTC calendar day.
///
/// Volume samples are matched to price samples on the exact timestamp. Each
/// volume sample is counted once; a price sample without a matching volume
/// contributes zero volume and a volume sample without a price is discarded.
/// Days with no price samples produce no bar.
pub fn normalize_crypto(symbol: &str, chart: &CryptoChart) -> BarSeries {
    let mut volumes: HashMap<i64, f64> = HashMap::with_capacity(chart.volumes.len());
    for tick in &chart.volumes {
        if !tick.volume.is_finite() || tick.volume < 0.0 {
            tracing::warn!(symbol, timestamp_ms = tick.timestamp_ms, volume = tick.volume, "dropping invalid volume tick");
            continue;
        }
        volumes.entry(tick.timestamp_ms).or_insert(tick.volume);
    }

    let mut prices: Vec<_> = chart
        .prices
        .iter()
        .filter(|tick| {
            let ok = tick.price.is_finite() && tick.price > 0.0;
            if !ok {
                tracing::warn!(symbol, timestamp_ms = tick.timestamp_ms, price = tick.price, "dropping invalid price tick");
            }
            ok
        })
        .copied()
        .collect();
    prices.sort_by_key(|t| t.timestamp_ms);

    let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();
    for tick in &prices {
        let Some(date) = utc_date(tick.timestamp_ms) else {
            tracing::warn!(symbol, timestamp_ms = tick.timestamp_ms, "dropping price tick with out-of-range timestamp");
            continue;
        };
        let volume = volumes.remove(&tick.timestamp_ms).unwrap_or(0.0);
        days.entry(date)
            .and_modify(|acc| acc.push(tick.price, volume))
            .or_insert_with(|| DayAccumulator::start(tick.price, volume));
    }

    if !volumes.is_empty() {
        tracing::debug!(symbol, unmatched = volumes.len(), "volume ticks without a matching price tick");
    }

    let bars: Vec<Bar> = days
        .into_iter()
        .map(|(date, acc)| Bar {
            date,
            open: acc.open,
            high: acc.high,
            low: acc.low,
            close: acc.close,
            volume: acc.volume,
        })
        .collect();

    let series = BarSeries::new(symbol, bars);
    tracing::debug!(symbol, ticks = chart.prices.len(), bars = series.len(), "normalized crypto ticks");
    series
}
