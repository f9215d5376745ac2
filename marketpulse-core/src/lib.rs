//! MarketPulse Core: market data normalization, technical indicators and news
//! inputs for a daily market dashboard.
//!
//! - Domain types (bars, canonical series, derived indicator columns, assets)
//! - Bar Normalizer turning equity rows and crypto ticks into daily bars
//! - Indicator engine (IBS, SMA, EMA, RSI, MACD, Bollinger) with per-kind composition
//! - Upstream providers behind traits, with retry and a circuit breaker
//! - Dashboard pipeline with per-asset isolation and a TTL cache
//! - News gathering, AI summary and keyword tracking

pub mod cache;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod domain;
pub mod indicators;
pub mod news;
pub mod stats;
