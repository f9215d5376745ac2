//! Per-asset dashboard pipeline: fetch, normalize, compute indicators and
//! summaries.
//!
//! Each asset runs in isolation. A failed fetch becomes
//! [`AssetStatus::Unavailable`] and an empty normalized series becomes
//! [`AssetStatus::NoData`]; neither affects the other assets in a snapshot.

use crate::cache::{MarketKey, TtlCache};
use crate::config::DashboardConfig;
use crate::data::{normalize_crypto, normalize_equity, CryptoProvider, DataError, EquityProvider};
use crate::domain::{Asset, AssetKind, BarSeries, DerivedSeries};
use crate::indicators::{apply_indicators, ibs, AugmentedBars, IndicatorSet};
use crate::stats::{IbsSummary, PriceSummary, VolumeSummary};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Everything displayed for one asset with data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetReport {
    pub augmented: AugmentedBars,
    pub ibs: DerivedSeries,
    pub ibs_summary: Option<IbsSummary>,
    pub price: Option<PriceSummary>,
    pub volume: Option<VolumeSummary>,
}

impl AssetReport {
    pub fn from_series(series: &BarSeries, set: &IndicatorSet, config: &DashboardConfig) -> Self {
        let augmented = apply_indicators(series, set, &config.params);
        let ibs = ibs(series);
        Self {
            ibs_summary: IbsSummary::from_series(&ibs),
            price: PriceSummary::from_series(series),
            volume: VolumeSummary::from_series(series),
            augmented,
            ibs,
        }
    }

    pub fn series(&self) -> &BarSeries {
        self.augmented.series()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AssetStatus {
    Ready(Box<AssetReport>),
    /// Upstream answered, but nothing survived normalization.
    NoData,
    /// Upstream failed.
    Unavailable { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetView {
    pub asset: Asset,
    pub status: AssetStatus,
}

impl AssetView {
    pub fn report(&self) -> Option<&AssetReport> {
        match &self.status {
            AssetStatus::Ready(report) => Some(report.as_ref()),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.report().is_some()
    }
}

pub struct Dashboard {
    config: DashboardConfig,
    equity: Arc<dyn EquityProvider>,
    crypto: Arc<dyn CryptoProvider>,
    cache: TtlCache<MarketKey, AssetView>,
    parallel: bool,
}

impl Dashboard {
    pub fn new(
        config: DashboardConfig,
        equity: Arc<dyn EquityProvider>,
        crypto: Arc<dyn CryptoProvider>,
    ) -> Self {
        let cache = TtlCache::new(config.cache.market_ttl());
        Self {
            config,
            equity,
            crypto,
            cache,
            parallel: true,
        }
    }

    /// Fetch assets one at a time instead of fanning out.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Fetch and normalize one asset. Errors are the provider's.
    pub fn fetch_series(&self, asset: &Asset, days: u32) -> Result<BarSeries, DataError> {
        match asset.kind {
            AssetKind::Equity => {
                let rows = self.equity.fetch_daily(&asset.id, days)?;
                Ok(normalize_equity(&asset.id, &rows))
            }
            AssetKind::Crypto => {
                let chart = self.crypto.fetch_market_chart(&asset.id, days)?;
                Ok(normalize_crypto(&asset.id, &chart))
            }
        }
    }

    fn build_view(&self, asset: &Asset, days: u32, set: &IndicatorSet) -> Result<AssetView, DataError> {
        let started = Instant::now();
        let series = self.fetch_series(asset, days)?;

        let status = if series.is_empty() {
            tracing::warn!(asset = %asset.name, id = %asset.id, "no usable bars after normalization");
            AssetStatus::NoData
        } else {
            let report = AssetReport::from_series(&series, set, &self.config);
            tracing::info!(
                asset = %asset.name,
                bars = series.len(),
                columns = report.augmented.columns().len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "asset pipeline complete"
            );
            AssetStatus::Ready(Box::new(report))
        };

        Ok(AssetView {
            asset: asset.clone(),
            status,
        })
    }

    /// The view for one asset, served from the cache when fresh.
    pub fn asset_view(&self, asset: &Asset, days: u32, set: &IndicatorSet) -> AssetView {
        let key = MarketKey {
            asset_id: asset.id.clone(),
            days,
            indicators: set.clone(),
        };
        if let Some(view) = self.cache.get(&key) {
            tracing::debug!(id = %asset.id, days, indicators = %set.key(), "market cache hit");
            return view;
        }

        match self.build_view(asset, days, set) {
            Ok(view) => {
                self.cache.insert(key, view.clone());
                view
            }
            Err(e) => {
                tracing::warn!(asset = %asset.name, id = %asset.id, error = %e, "asset unavailable");
                AssetView {
                    asset: asset.clone(),
                    status: AssetStatus::Unavailable {
                        reason: e.to_string(),
                    },
                }
            }
        }
    }

    /// Views for every configured asset, in configured order.
    pub fn snapshot(&self, days: u32, set: &IndicatorSet) -> Vec<AssetView> {
        let assets = &self.config.assets;
        if self.parallel {
            assets
                .par_iter()
                .map(|asset| self.asset_view(asset, days, set))
                .collect()
        } else {
            assets
                .iter()
                .map(|asset| self.asset_view(asset, days, set))
                .collect()
        }
    }

    /// Drop every cached view so the next request refetches.
    pub fn clear_cache(&self) {
        tracing::debug!(entries = self.cache.len(), "clearing market cache");
        self.cache.clear();
    }

    pub fn cached_views(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CryptoChart, EquityRow, PriceTick, VolumeTick};
    use crate::indicators::IndicatorKind;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubEquity {
        calls: AtomicUsize,
    }

    impl EquityProvider for StubEquity {
        fn name(&self) -> &str {
            "stub"
        }

        fn fetch_daily(&self, ticker: &str, _days: u32) -> Result<Vec<EquityRow>, DataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if ticker == "^DJI" {
                return Err(DataError::NetworkUnreachable("connection reset".into()));
            }
            let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
            Ok((0..30)
                .map(|i| {
                    let close = 100.0 + i as f64;
                    EquityRow {
                        date: start + chrono::Days::new(i),
                        open: Some(close),
                        high: Some(close + 1.0),
                        low: Some(close - 1.0),
                        close: Some(close),
                        volume: Some(1000.0),
                    }
                })
                .collect())
        }
    }

    struct StubCrypto;

    impl CryptoProvider for StubCrypto {
        fn name(&self) -> &str {
            "stub"
        }

        fn fetch_market_chart(&self, coin_id: &str, _days: u32) -> Result<CryptoChart, DataError> {
            if coin_id == "ethereum" {
                return Ok(CryptoChart::default());
            }
            Ok(CryptoChart {
                prices: vec![PriceTick {
                    timestamp_ms: 1_704_067_200_000,
                    price: 42_000.0,
                }],
                volumes: vec![VolumeTick {
                    timestamp_ms: 1_704_067_200_000,
                    volume: 5.0,
                }],
            })
        }
    }

    fn dashboard() -> (Dashboard, Arc<StubEquity>) {
        let equity = Arc::new(StubEquity {
            calls: AtomicUsize::new(0),
        });
        let dash = Dashboard::new(DashboardConfig::default(), equity.clone(), Arc::new(StubCrypto));
        (dash, equity)
    }

    #[test]
    fn snapshot_isolates_failures() {
        let (dash, _) = dashboard();
        let views = dash.snapshot(30, &IndicatorSet::new([IndicatorKind::Sma]));
        let ids: Vec<&str> = views.iter().map(|v| v.asset.id.as_str()).collect();
        assert_eq!(ids, vec!["^GSPC", "^DJI", "^IXIC", "bitcoin", "ethereum"]);

        assert!(views[0].is_ready());
        assert!(matches!(views[1].status, AssetStatus::Unavailable { .. }));
        assert!(views[2].is_ready());
        assert!(views[3].is_ready());
        assert_eq!(views[4].status, AssetStatus::NoData);
    }

    #[test]
    fn ready_report_has_columns_and_summaries() {
        let (dash, _) = dashboard();
        let view = dash.asset_view(&Asset::equity("S&P 500", "^GSPC"), 30, &IndicatorSet::new([IndicatorKind::Sma]));
        let report = view.report().unwrap();
        assert!(report.augmented.has_column("sma_20"));
        assert!(!report.augmented.has_column("sma_50"));
        assert_eq!(report.ibs.len(), 30);
        assert_eq!(report.price.unwrap().last_close, 129.0);
    }

    #[test]
    fn cached_view_skips_refetch_until_cleared() {
        let (dash, equity) = dashboard();
        let asset = Asset::equity("Nasdaq", "^IXIC");
        let set = IndicatorSet::new([IndicatorKind::Rsi]);
        dash.asset_view(&asset, 30, &set);
        dash.asset_view(&asset, 30, &set);
        assert_eq!(equity.calls.load(Ordering::SeqCst), 1);

        dash.asset_view(&asset, 90, &set);
        assert_eq!(equity.calls.load(Ordering::SeqCst), 2);

        dash.clear_cache();
        dash.asset_view(&asset, 30, &set);
        assert_eq!(equity.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn failures_are_not_cached() {
        let (dash, equity) = dashboard();
        let asset = Asset::equity("Dow Jones", "^DJI");
        let set = IndicatorSet::default();
        dash.asset_view(&asset, 30, &set);
        dash.asset_view(&asset, 30, &set);
        assert_eq!(equity.calls.load(Ordering::SeqCst), 2);
        assert_eq!(dash.cached_views(), 0);
    }
}
