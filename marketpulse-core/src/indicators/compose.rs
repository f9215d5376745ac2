//! Indicator composition: pick a subset of indicator kinds, run each one
//! independently over a copy of the bars, and collect the computable columns.
//!
//! Insufficient history is not an error. A column whose minimum bar count is
//! not met is left out, so callers test for the key rather than scanning for
//! placeholder values.

use super::{Bollinger, Ibs, Indicator, Macd, Rsi, Sma};
use crate::domain::{BarSeries, DerivedSeries};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Indicator families that can be requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorKind {
    Ibs,
    Sma,
    Rsi,
    Macd,
    #[serde(alias = "bb")]
    Bollinger,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 5] = [
        IndicatorKind::Ibs,
        IndicatorKind::Sma,
        IndicatorKind::Rsi,
        IndicatorKind::Macd,
        IndicatorKind::Bollinger,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorKind::Ibs => "ibs",
            IndicatorKind::Sma => "sma",
            IndicatorKind::Rsi => "rsi",
            IndicatorKind::Macd => "macd",
            IndicatorKind::Bollinger => "bollinger",
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown indicator '{0}' (expected one of: ibs, sma, rsi, macd, bollinger)")]
pub struct ParseIndicatorError(pub String);

impl FromStr for IndicatorKind {
    type Err = ParseIndicatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ibs" => Ok(IndicatorKind::Ibs),
            "sma" | "ma" => Ok(IndicatorKind::Sma),
            "rsi" => Ok(IndicatorKind::Rsi),
            "macd" => Ok(IndicatorKind::Macd),
            "bb" | "bollinger" => Ok(IndicatorKind::Bollinger),
            other => Err(ParseIndicatorError(other.to_string())),
        }
    }
}

/// Window and period parameters for every indicator family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub sma_periods: Vec<usize>,
    pub rsi_window: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_window: usize,
    pub bollinger_multiplier: f64,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            sma_periods: vec![20, 50],
            rsi_window: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_window: 20,
            bollinger_multiplier: 2.0,
        }
    }
}

/// A window or period the indicator constructors cannot accept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidParams {
    #[error("{0} must be >= 1")]
    ZeroWindow(&'static str),

    #[error("macd_fast ({fast}) must be below macd_slow ({slow})")]
    MacdOrder { fast: usize, slow: usize },

    #[error("bollinger_multiplier must be a non-negative number")]
    BadMultiplier,
}

impl IndicatorParams {
    /// Check every family's parameters.
    pub fn validate(&self) -> Result<(), InvalidParams> {
        IndicatorKind::ALL
            .into_iter()
            .try_for_each(|kind| self.check(kind))
    }

    /// Check the parameters one family uses.
    pub fn check(&self, kind: IndicatorKind) -> Result<(), InvalidParams> {
        let nonzero = |name, value: usize| {
            if value == 0 {
                Err(InvalidParams::ZeroWindow(name))
            } else {
                Ok(())
            }
        };
        match kind {
            IndicatorKind::Ibs => Ok(()),
            IndicatorKind::Sma => self
                .sma_periods
                .iter()
                .try_for_each(|&w| nonzero("sma_periods", w)),
            IndicatorKind::Rsi => nonzero("rsi_window", self.rsi_window),
            IndicatorKind::Macd => {
                nonzero("macd_fast", self.macd_fast)?;
                nonzero("macd_signal", self.macd_signal)?;
                if self.macd_fast >= self.macd_slow {
                    return Err(InvalidParams::MacdOrder {
                        fast: self.macd_fast,
                        slow: self.macd_slow,
                    });
                }
                Ok(())
            }
            IndicatorKind::Bollinger => {
                nonzero("bollinger_window", self.bollinger_window)?;
                let m = self.bollinger_multiplier;
                if !m.is_finite() || m < 0.0 {
                    return Err(InvalidParams::BadMultiplier);
                }
                Ok(())
            }
        }
    }

    /// The indicator instances (one per output column) for a kind.
    /// Callers run `check(kind)` first; the constructors assert on bad windows.
    fn instances(&self, kind: IndicatorKind) -> Vec<Box<dyn Indicator>> {
        match kind {
            IndicatorKind::Ibs => vec![Box::new(Ibs::new())],
            IndicatorKind::Sma => self
                .sma_periods
                .iter()
                .map(|&p| Box::new(Sma::new(p)) as Box<dyn Indicator>)
                .collect(),
            IndicatorKind::Rsi => vec![Box::new(Rsi::new(self.rsi_window))],
            IndicatorKind::Macd => {
                let (f, s, g) = (self.macd_fast, self.macd_slow, self.macd_signal);
                vec![
                    Box::new(Macd::line(f, s, g)),
                    Box::new(Macd::signal_line(f, s, g)),
                    Box::new(Macd::histogram(f, s, g)),
                ]
            }
            IndicatorKind::Bollinger => {
                let (w, m) = (self.bollinger_window, self.bollinger_multiplier);
                vec![
                    Box::new(Bollinger::upper(w, m)),
                    Box::new(Bollinger::middle(w, m)),
                    Box::new(Bollinger::lower(w, m)),
                ]
            }
        }
    }
}

/// Ordered, de-duplicated set of requested indicator kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<IndicatorKind>", into = "Vec<IndicatorKind>")]
pub struct IndicatorSet {
    kinds: Vec<IndicatorKind>,
}

impl IndicatorSet {
    pub fn new(kinds: impl IntoIterator<Item = IndicatorKind>) -> Self {
        let mut kinds: Vec<IndicatorKind> = kinds.into_iter().collect();
        kinds.sort();
        kinds.dedup();
        Self { kinds }
    }

    pub fn all() -> Self {
        Self::new(IndicatorKind::ALL)
    }

    pub fn kinds(&self) -> &[IndicatorKind] {
        &self.kinds
    }

    pub fn contains(&self, kind: IndicatorKind) -> bool {
        self.kinds.contains(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Stable textual key, e.g. "sma+rsi".
    pub fn key(&self) -> String {
        self.kinds
            .iter()
            .map(IndicatorKind::as_str)
            .collect::<Vec<_>>()
            .join("+")
    }
}

impl From<Vec<IndicatorKind>> for IndicatorSet {
    fn from(kinds: Vec<IndicatorKind>) -> Self {
        Self::new(kinds)
    }
}

impl From<IndicatorSet> for Vec<IndicatorKind> {
    fn from(set: IndicatorSet) -> Self {
        set.kinds
    }
}

impl FromStr for IndicatorSet {
    type Err = ParseIndicatorError;

    /// Parse a comma-separated list such as "sma,rsi,bb". Empty input is the empty set.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kinds = s
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(IndicatorKind::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(kinds))
    }
}

/// Compute every column of one indicator family.
///
/// Returns an empty vec when the series is too short for the family; columns
/// within a family are checked individually (e.g. SMA 20 present, SMA 50 not).
/// Unusable parameters for the family also give an empty vec, with a warning.
pub fn compute_indicator(
    series: &BarSeries,
    kind: IndicatorKind,
    params: &IndicatorParams,
) -> Vec<DerivedSeries> {
    if let Err(e) = params.check(kind) {
        tracing::warn!(symbol = series.symbol(), family = %kind, error = %e, "skipping family");
        return Vec::new();
    }
    let bars = series.bars();
    params
        .instances(kind)
        .into_iter()
        .filter_map(|indicator| {
            if bars.len() < indicator.min_bars() {
                tracing::debug!(
                    symbol = series.symbol(),
                    column = indicator.name(),
                    bars = bars.len(),
                    required = indicator.min_bars(),
                    "skipping column: insufficient history"
                );
                return None;
            }
            Some(DerivedSeries::from_raw(
                indicator.name(),
                bars,
                indicator.compute(bars),
            ))
        })
        .collect()
}

/// Internal bar strength for every bar. Never drops dates; empty in, empty out.
pub fn ibs(series: &BarSeries) -> DerivedSeries {
    let bars = series.bars();
    let ibs = Ibs::new();
    DerivedSeries::from_raw(ibs.name(), bars, ibs.compute(bars))
}

/// Bars plus the computed indicator columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AugmentedBars {
    series: BarSeries,
    columns: Vec<DerivedSeries>,
}

impl AugmentedBars {
    pub fn series(&self) -> &BarSeries {
        &self.series
    }

    pub fn columns(&self) -> &[DerivedSeries] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&DerivedSeries> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name()).collect()
    }
}

/// Apply exactly the requested subset to a copy of `series`.
pub fn apply_indicators(
    series: &BarSeries,
    set: &IndicatorSet,
    params: &IndicatorParams,
) -> AugmentedBars {
    let columns = set
        .kinds()
        .iter()
        .flat_map(|&kind| compute_indicator(series, kind, params))
        .collect();
    AugmentedBars {
        series: series.clone(),
        columns,
    }
}
