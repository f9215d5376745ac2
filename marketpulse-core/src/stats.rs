//! Summary statistics shown next to each asset's charts.
//!
//! Every summary is `None` for an empty input. Ratios whose denominator is
//! zero are reported as absent rather than infinite.

use crate::domain::{BarSeries, DerivedSeries};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IbsSummary {
    pub current: f64,
    pub average: f64,
    pub high: f64,
    pub low: f64,
}

impl IbsSummary {
    pub fn from_series(ibs: &DerivedSeries) -> Option<Self> {
        let values: Vec<f64> = ibs.defined().map(|(_, v)| v).collect();
        let current = *values.last()?;
        Some(Self {
            current,
            average: values.iter().sum::<f64>() / values.len() as f64,
            high: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            low: values.iter().copied().fold(f64::INFINITY, f64::min),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSummary {
    pub last_close: f64,
    /// Percent change against the previous close.
    pub change_pct: Option<f64>,
    pub period_high: f64,
    pub period_low: f64,
    pub last_volume: f64,
}

impl PriceSummary {
    pub fn from_series(series: &BarSeries) -> Option<Self> {
        let bars = series.bars();
        let last = bars.last()?;
        let change_pct = bars
            .len()
            .checked_sub(2)
            .map(|i| bars[i].close)
            .filter(|prev| *prev != 0.0)
            .map(|prev| (last.close / prev - 1.0) * 100.0);

        Some(Self {
            last_close: last.close,
            change_pct,
            period_high: bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max),
            period_low: bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min),
            last_volume: last.volume,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeSummary {
    pub recent: f64,
    pub average: f64,
    /// Recent volume against the period average, in percent.
    pub vs_average_pct: Option<f64>,
}

impl VolumeSummary {
    pub fn from_series(series: &BarSeries) -> Option<Self> {
        let bars = series.bars();
        let recent = bars.last()?.volume;
        let average = bars.iter().map(|b| b.volume).sum::<f64>() / bars.len() as f64;
        let vs_average_pct = (average != 0.0).then(|| (recent / average - 1.0) * 100.0);
        Some(Self {
            recent,
            average,
            vs_average_pct,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Bar;
    use crate::indicators::{assert_approx, ibs, DEFAULT_EPSILON};
    use chrono::NaiveDate;

    fn bar(day: u32, low: f64, high: f64, close: f64, volume: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            open: close,
            high,
            low,
            close,
            volume,
        }
    }

    fn sample() -> BarSeries {
        BarSeries::new(
            "SPY",
            vec![
                bar(1, 90.0, 110.0, 110.0, 100.0),
                bar(2, 95.0, 105.0, 100.0, 200.0),
                bar(3, 99.0, 121.0, 99.0, 300.0),
            ],
        )
    }

    #[test]
    fn ibs_summary() {
        let s = IbsSummary::from_series(&ibs(&sample())).unwrap();
        assert_approx(s.current, -50.0, DEFAULT_EPSILON);
        assert_approx(s.high, 50.0, DEFAULT_EPSILON);
        assert_approx(s.low, -50.0, DEFAULT_EPSILON);
        assert_approx(s.average, 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn price_summary() {
        let s = PriceSummary::from_series(&sample()).unwrap();
        assert_eq!(s.last_close, 99.0);
        assert_approx(s.change_pct.unwrap(), -1.0, 1e-9);
        assert_eq!(s.period_high, 121.0);
        assert_eq!(s.period_low, 90.0);
        assert_eq!(s.last_volume, 300.0);
    }

    #[test]
    fn single_bar_has_no_change() {
        let s = PriceSummary::from_series(&sample().tail(1)).unwrap();
        assert_eq!(s.change_pct, None);
    }

    #[test]
    fn volume_summary() {
        let s = VolumeSummary::from_series(&sample()).unwrap();
        assert_eq!(s.recent, 300.0);
        assert_eq!(s.average, 200.0);
        assert_approx(s.vs_average_pct.unwrap(), 50.0, 1e-9);
    }

    #[test]
    fn zero_average_volume_has_no_ratio() {
        let series = BarSeries::new("X", vec![bar(1, 1.0, 2.0, 1.5, 0.0)]);
        assert_eq!(VolumeSummary::from_series(&series).unwrap().vs_average_pct, None);
    }

    #[test]
    fn empty_series_has_no_summaries() {
        let empty = BarSeries::empty("X");
        assert!(PriceSummary::from_series(&empty).is_none());
        assert!(VolumeSummary::from_series(&empty).is_none());
        assert!(IbsSummary::from_series(&ibs(&empty)).is_none());
    }
}
