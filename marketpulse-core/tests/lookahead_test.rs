//! Look-ahead contamination tests for every indicator column.
//!
//! No indicator value at bar t may depend on bars after t. Each indicator is
//! computed on a truncated series (bars 0..80) and on the full series
//! (bars 0..160); the shared prefix must be identical.

use chrono::NaiveDate;
use marketpulse_core::domain::{Bar, BarSeries};
use marketpulse_core::indicators::*;

fn make_test_bars(n: usize) -> Vec<Bar> {
    let base_date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let mut price = 100.0;
    (0..n)
        .map(|i| {
            // deterministic pseudo-random walk (LCG)
            let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1);
            price += ((seed % 200) as f64 - 100.0) * 0.05;
            price = f64::max(price, 10.0);

            let open = price - 0.5;
            let close = price + 0.3;
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 2.0,
                low: open.min(close) - 2.0,
                close,
                volume: 1000.0 + i as f64 * 100.0,
            }
        })
        .collect()
}

fn assert_no_lookahead(indicator: &dyn Indicator, full_bars: &[Bar], truncated_len: usize) {
    let full = indicator.compute(full_bars);
    let truncated = indicator.compute(&full_bars[..truncated_len]);

    assert_eq!(truncated.len(), truncated_len, "{}: truncated length", indicator.name());
    assert_eq!(full.len(), full_bars.len(), "{}: full length", indicator.name());

    for i in 0..truncated_len {
        let (t, f) = (truncated[i], full[i]);
        if t.is_nan() && f.is_nan() {
            continue;
        }
        assert_eq!(t, f, "{}: value differs at bar {i}", indicator.name());
    }
}

fn all_indicators() -> Vec<Box<dyn Indicator>> {
    vec![
        Box::new(Ibs::new()),
        Box::new(Sma::new(20)),
        Box::new(Sma::new(50)),
        Box::new(Rsi::new(14)),
        Box::new(Macd::line(12, 26, 9)),
        Box::new(Macd::signal_line(12, 26, 9)),
        Box::new(Macd::histogram(12, 26, 9)),
        Box::new(Bollinger::upper(20, 2.0)),
        Box::new(Bollinger::middle(20, 2.0)),
        Box::new(Bollinger::lower(20, 2.0)),
    ]
}

#[test]
fn no_indicator_looks_ahead() {
    let bars = make_test_bars(160);
    for indicator in all_indicators() {
        assert_no_lookahead(indicator.as_ref(), &bars, 80);
    }
}

#[test]
fn warmup_matches_declared_lookback() {
    let bars = make_test_bars(160);
    for indicator in all_indicators() {
        let values = indicator.compute(&bars);
        let lookback = indicator.lookback();
        assert!(
            values[..lookback].iter().all(|v| v.is_nan()),
            "{}: value inside warmup",
            indicator.name()
        );
        assert!(
            values[lookback..].iter().all(|v| v.is_finite()),
            "{}: missing value after warmup",
            indicator.name()
        );
    }
}

#[test]
fn composed_columns_match_on_prefix() {
    let bars = make_test_bars(160);
    let full = BarSeries::new("TEST", bars.clone());
    let prefix = BarSeries::new("TEST", bars[..80].to_vec());
    let params = IndicatorParams::default();

    let full_out = apply_indicators(&full, &IndicatorSet::all(), &params);
    let prefix_out = apply_indicators(&prefix, &IndicatorSet::all(), &params);

    for column in prefix_out.columns() {
        let long = full_out.column(column.name()).unwrap();
        assert_eq!(column.values(), &long.values()[..80], "{}", column.name());
    }
}
