//! Domain types for marketpulse

pub mod asset;
pub mod bar;
pub mod series;

pub use asset::{Asset, AssetKind};
pub use bar::{Bar, BarError};
pub use series::{BarSeries, DerivedSeries};
