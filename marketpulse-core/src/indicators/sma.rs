//! `sma_{w}`: arithmetic mean of the last `w` closes.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        sma_of_series(&closes, self.period)
    }
}

/// Mean of each full `period`-wide window of `values`, NaN before the first.
///
/// Bollinger's middle band goes through this too, so the two columns agree exactly.
/// Every window is summed on its own; a NaN only poisons the windows containing it.
pub fn sma_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }
    let denom = period as f64;
    for (slot, window) in out[period - 1..]
        .iter_mut()
        .zip(values.windows(period))
    {
        *slot = window.iter().sum::<f64>() / denom;
    }
    out
}
