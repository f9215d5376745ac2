//! `rsi_{w}`: Wilder's relative strength index.
//!
//! Average up and down moves are seeded with a plain mean of the first `w`
//! close-to-close changes, then smoothed by `1/w`. The first value lands on
//! bar `w`. A window without any down move reads 100, flat windows included.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let w = self.period;
        let mut out = vec![f64::NAN; bars.len()];
        if bars.len() <= w {
            return out;
        }

        // deltas[i] is the move into bar i + 1
        let deltas: Vec<f64> = bars.windows(2).map(|p| p[1].close - p[0].close).collect();
        let (seed, rest) = deltas.split_at(w);

        let mut up = seed.iter().map(|d| d.max(0.0)).sum::<f64>() / w as f64;
        let mut down = seed.iter().map(|d| (-d).max(0.0)).sum::<f64>() / w as f64;
        out[w] = strength_index(up, down);

        let keep = (w as f64 - 1.0) / w as f64;
        for (slot, &d) in out[w + 1..].iter_mut().zip(rest) {
            up = up * keep + d.max(0.0) / w as f64;
            down = down * keep + (-d).max(0.0) / w as f64;
            *slot = strength_index(up, down);
        }
        out
    }
}

/// 100 when nothing was lost, otherwise `100 - 100 / (1 + up / down)`.
fn strength_index(up: f64, down: f64) -> f64 {
    if down == 0.0 {
        100.0
    } else {
        (100.0 - 100.0 / (1.0 + up / down)).clamp(0.0, 100.0)
    }
}
