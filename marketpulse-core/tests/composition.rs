//! Composition contract: exactly the requested subset, independent of order,
//! over a copy of the bars, with too-short columns left out.

use chrono::NaiveDate;
use marketpulse_core::domain::{Bar, BarSeries};
use marketpulse_core::indicators::*;

fn series(n: usize) -> BarSeries {
    let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let bars = (0..n)
        .map(|i| {
            let close = 50.0 + (i as f64 * 0.45).sin() * 4.0 + i as f64 * 0.05;
            Bar {
                date: base + chrono::Duration::days(i as i64),
                open: close - 0.2,
                high: close + 0.8,
                low: close - 0.9,
                close,
                volume: 10_000.0,
            }
        })
        .collect();
    BarSeries::new("COMP", bars)
}

#[test]
fn ten_bars_with_sma_20_has_no_column() {
    let params = IndicatorParams {
        sma_periods: vec![20],
        ..IndicatorParams::default()
    };
    let out = apply_indicators(&series(10), &"sma".parse().unwrap(), &params);
    assert!(!out.has_column("sma_20"));
    assert!(out.column("sma_20").is_none());
    assert!(out.columns().is_empty());
}

#[test]
fn each_family_matches_its_standalone_computation() {
    let s = series(120);
    let params = IndicatorParams::default();
    let combined = apply_indicators(&s, &IndicatorSet::all(), &params);

    for kind in IndicatorKind::ALL {
        for column in compute_indicator(&s, kind, &params) {
            assert_eq!(combined.column(column.name()), Some(&column), "{}", column.name());
        }
    }
}

#[test]
fn request_order_does_not_matter() {
    let s = series(60);
    let params = IndicatorParams::default();
    let a = apply_indicators(&s, &"bb,rsi,macd".parse().unwrap(), &params);
    let b = apply_indicators(&s, &"macd,bollinger,rsi".parse().unwrap(), &params);
    assert_eq!(a, b);
}

#[test]
fn minimum_history_boundaries() {
    let params = IndicatorParams::default();
    let cases: [(IndicatorKind, &str, usize); 4] = [
        (IndicatorKind::Sma, "sma_20", 20),
        (IndicatorKind::Rsi, "rsi_14", 15),
        (IndicatorKind::Macd, "macd", 26),
        (IndicatorKind::Bollinger, "bb_middle_20", 20),
    ];
    for (kind, column, min) in cases {
        let set = IndicatorSet::new([kind]);
        assert!(!apply_indicators(&series(min - 1), &set, &params).has_column(column), "{column} at {}", min - 1);
        assert!(apply_indicators(&series(min), &set, &params).has_column(column), "{column} at {min}");
    }
}

#[test]
fn derived_dates_are_the_bar_dates() {
    let s = series(45);
    let out = apply_indicators(&s, &IndicatorSet::all(), &IndicatorParams::default());
    let dates = s.dates();
    for column in out.columns() {
        assert_eq!(column.dates(), dates.as_slice());
        let first = column.defined().next().map(|(d, _)| d);
        if let Some(first) = first {
            assert!(column.get(first).is_some());
        }
    }
    assert_eq!(out.series(), &s);
}

#[test]
fn custom_windows_rename_columns() {
    let params = IndicatorParams {
        sma_periods: vec![5, 10],
        rsi_window: 7,
        bollinger_window: 10,
        ..IndicatorParams::default()
    };
    let out = apply_indicators(&series(30), &"sma,rsi,bb".parse().unwrap(), &params);
    assert_eq!(
        out.column_names(),
        vec!["sma_5", "sma_10", "rsi_7", "bb_upper_10", "bb_middle_10", "bb_lower_10"]
    );
}
