//! Internal Bar Strength (IBS).
//!
//! IBS = ((close - low) / (high - low) - 0.5) * 100, in [-50, +50].
//! A flat bar (high == low) has no defined position; it is pinned to the
//! midpoint so IBS == 0 exactly.
//! Lookback: 0.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone, Default)]
pub struct Ibs;

impl Ibs {
    pub fn new() -> Self {
        Self
    }
}

/// IBS of a single bar.
pub fn bar_strength(bar: &Bar) -> f64 {
    let range = bar.high - bar.low;
    let position = if range == 0.0 {
        0.5
    } else {
        (bar.close - bar.low) / range
    };
    (position - 0.5) * 100.0
}

impl Indicator for Ibs {
    fn name(&self) -> &str {
        "ibs"
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        bars.iter().map(bar_strength).collect()
    }
}
