//! Technical indicators over a canonical bar series.
//!
//! Each column is produced by one `Indicator` implementation. Multi-column
//! indicators (MACD, Bollinger) are exposed as separate named instances per
//! output, keeping the single-series trait unchanged. The `compose` module
//! selects which instances to run for a requested `IndicatorKind` and turns
//! their raw output into date-aligned `DerivedSeries`.

pub mod bollinger;
pub mod compose;
pub mod ema;
pub mod ibs;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use bollinger::{Bollinger, BollingerBand};
pub use compose::{
    apply_indicators, compute_indicator, ibs, AugmentedBars, IndicatorKind, IndicatorParams,
    IndicatorSet, InvalidParams, ParseIndicatorError,
};
pub use ibs::Ibs;
pub use macd::{Macd, MacdOutput};
pub use rsi::Rsi;
pub use sma::Sma;

use crate::domain::Bar;

/// One derived column computed from a bar slice.
///
/// Output has one slot per bar; slots before enough history exist are NaN.
/// A value at bar `t` reads only bars `0..=t`, so a prefix of the input
/// yields a prefix of the output.
pub trait Indicator: Send + Sync {
    /// Column name, e.g. `sma_20`.
    fn name(&self) -> &str;

    /// Leading slots that are always NaN.
    fn lookback(&self) -> usize;

    /// Shortest input for which the column is emitted at all.
    fn min_bars(&self) -> usize {
        self.lookback() + 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Daily test bars from closes: each bar opens at the previous close and
/// spans one point beyond its body on both sides.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let first_day = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let opens = closes.first().into_iter().chain(closes.iter()).copied();
    closes
        .iter()
        .zip(opens)
        .zip(first_day.iter_days())
        .map(|((&close, open), date)| Bar {
            date,
            open,
            high: open.max(close) + 1.0,
            low: open.min(close) - 1.0,
            close,
            volume: 1000.0,
        })
        .collect()
}

#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    let diff = (actual - expected).abs();
    assert!(diff < epsilon, "{actual} != {expected} (diff {diff}, eps {epsilon})");
}

#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
