//! Bollinger bands `bb_{upper,middle,lower}_{w}`.
//!
//! The middle band is `sma_{w}`; the outer bands sit `multiplier` sample
//! standard deviations of the same `w` closes above and below it. A one-bar
//! window has zero width.

use super::sma::sma_of_series;
use super::Indicator;
use crate::domain::Bar;

/// Which band of the Bollinger Bands to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Upper,
    Middle,
    Lower,
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    band: BollingerBand,
    name: String,
}

impl Bollinger {
    fn with_band(period: usize, multiplier: f64, band: BollingerBand) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        let label = match band {
            BollingerBand::Upper => "upper",
            BollingerBand::Middle => "middle",
            BollingerBand::Lower => "lower",
        };
        Self {
            period,
            multiplier,
            band,
            name: format!("bb_{label}_{period}"),
        }
    }

    pub fn upper(period: usize, multiplier: f64) -> Self {
        Self::with_band(period, multiplier, BollingerBand::Upper)
    }

    pub fn middle(period: usize, multiplier: f64) -> Self {
        Self::with_band(period, multiplier, BollingerBand::Middle)
    }

    pub fn lower(period: usize, multiplier: f64) -> Self {
        Self::with_band(period, multiplier, BollingerBand::Lower)
    }
}

/// Spread of `window` around `mean`, with the `n - 1` denominator.
fn sample_stddev(window: &[f64], mean: f64) -> f64 {
    match window.len() {
        0 | 1 => 0.0,
        n => {
            let squares: f64 = window.iter().map(|v| (v - mean).powi(2)).sum();
            (squares / (n - 1) as f64).sqrt()
        }
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let mut bands = sma_of_series(&closes, self.period);
        let sign = match self.band {
            BollingerBand::Middle => return bands,
            BollingerBand::Upper => 1.0,
            BollingerBand::Lower => -1.0,
        };

        for (end, center) in bands.iter_mut().enumerate().skip(self.lookback()) {
            let window = &closes[end + 1 - self.period..=end];
            *center += sign * self.multiplier * sample_stddev(window, *center);
        }
        bands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::sma::Sma;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    fn three(bars: &[Bar], w: usize) -> [Vec<f64>; 3] {
        [
            Bollinger::upper(w, 2.0).compute(bars),
            Bollinger::middle(w, 2.0).compute(bars),
            Bollinger::lower(w, 2.0).compute(bars),
        ]
    }

    #[test]
    fn center_line_equals_sma_bit_for_bit() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0, 17.5, 9.25]);
        let [_, middle, _] = three(&bars, 3);
        let sma = Sma::new(3).compute(&bars);
        assert!(middle[..2].iter().all(|v| v.is_nan()));
        assert_eq!(&middle[2..], &sma[2..]);
    }

    #[test]
    fn width_uses_n_minus_one() {
        // 10, 11, 12 around 11: squares sum to 2, over 2 gives variance 1
        let [upper, _, lower] = three(&make_bars(&[10.0, 11.0, 12.0]), 3);
        assert_approx(upper[2], 13.0, DEFAULT_EPSILON);
        assert_approx(lower[2], 9.0, DEFAULT_EPSILON);
    }

    #[test]
    fn bands_mirror_each_other() {
        let [upper, middle, lower] = three(&make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]), 3);
        for i in 2..5 {
            assert_approx(upper[i] - middle[i], middle[i] - lower[i], DEFAULT_EPSILON);
        }
    }

    #[test]
    fn flat_prices_collapse_the_bands() {
        let [upper, middle, lower] = three(&make_bars(&[100.0; 4]), 3);
        assert_eq!(upper[3], middle[3]);
        assert_eq!(lower[3], middle[3]);
    }

    #[test]
    fn single_bar_window_has_no_width() {
        let [upper, _, lower] = three(&make_bars(&[10.0, 20.0]), 1);
        assert_eq!(upper, vec![10.0, 20.0]);
        assert_eq!(lower, upper);
    }

    #[test]
    fn column_names_carry_band_and_window() {
        assert_eq!(Bollinger::upper(20, 2.0).name(), "bb_upper_20");
        assert_eq!(Bollinger::middle(10, 2.0).name(), "bb_middle_10");
        assert_eq!(Bollinger::lower(20, 2.0).lookback(), 19);
    }
}
