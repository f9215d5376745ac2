//! Exponential smoothing helpers for MACD.
//!
//! Smoothing factor `k = 2 / (period + 1)`. The first output sits at
//! `period - 1` and is the plain mean of the first `period` inputs.

/// Exponentially smoothed copy of `values`, NaN until the seed index.
///
/// A NaN inside the seed window leaves the whole output NaN. A NaN after
/// the seed ends the series there.
pub fn ema_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let (seed_window, rest) = values.split_at(period);
    if seed_window.iter().any(|v| v.is_nan()) {
        return out;
    }
    let k = 2.0 / (period as f64 + 1.0);
    let mut level = seed_window.iter().sum::<f64>() / period as f64;
    out[period - 1] = level;

    for (slot, &x) in out[period..].iter_mut().zip(rest) {
        if x.is_nan() {
            break;
        }
        level = k * x + (1.0 - k) * level;
        *slot = level;
    }
    out
}

/// Like [`ema_of_series`], but the seed window starts at the first defined
/// input. Used to smooth a series that has its own warmup, such as the MACD line.
pub fn ema_after_warmup(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if let Some(start) = values.iter().position(|v| !v.is_nan()) {
        out[start..].copy_from_slice(&ema_of_series(&values[start..], period));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn period_one_is_identity() {
        assert_eq!(ema_of_series(&[100.0, 200.0, 300.0], 1), vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn half_weight_smoothing() {
        // period 3: k = 0.5, seed = mean(10, 11, 12)
        let out = ema_of_series(&[10.0, 11.0, 12.0, 13.0, 14.0], 3);
        assert!(out[0].is_nan() && out[1].is_nan());
        assert_approx(out[2], 11.0, DEFAULT_EPSILON);
        assert_approx(out[3], 12.0, DEFAULT_EPSILON);
        assert_approx(out[4], 13.0, DEFAULT_EPSILON);
    }

    #[test]
    fn nan_in_seed_window() {
        let out = ema_of_series(&[10.0, f64::NAN, 12.0, 13.0, 14.0], 3);
        assert!(out.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn nan_after_seed_truncates() {
        let out = ema_of_series(&[10.0, 10.0, f64::NAN, 12.0], 2);
        assert_eq!(out[1], 10.0);
        assert!(out[2].is_nan() && out[3].is_nan());
    }

    #[test]
    fn warmup_aware_seed() {
        let out = ema_after_warmup(&[f64::NAN, f64::NAN, 10.0, 11.0, 12.0, 13.0], 3);
        assert!(out[..4].iter().all(|v| v.is_nan()));
        assert_approx(out[4], 11.0, DEFAULT_EPSILON);
        assert_approx(out[5], 12.0, DEFAULT_EPSILON);
    }

    #[test]
    fn all_nan_input_stays_nan() {
        let out = ema_after_warmup(&[f64::NAN; 4], 2);
        assert_eq!(out.len(), 4);
        assert!(out.iter().all(|v| v.is_nan()));
    }
}
