//! Exchange rate abstractions and core types

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Fiat code to rate, e.g. `usd -> 64000.0`.
pub type FiatRates = BTreeMap<String, f64>;

/// Asset id to its fiat rates, e.g. `bitcoin -> {usd, eur, gbp}`.
pub type RateSnapshot = BTreeMap<String, FiatRates>;

/// A single point in a rate history series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateSample {
    /// Unix timestamp in seconds.
    pub timestamp: i64,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("asset not found")]
    AssetNotFound,
    #[error("fiat not found")]
    FiatNotFound,
    #[error("history not found")]
    HistoryNotFound,
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Fetches the current rate of every asset in `assets` quoted in every
    /// fiat in `fiats`. Assets the feed does not know are left out.
    async fn fetch_rates(&self, assets: &[String], fiats: &[String]) -> Result<RateSnapshot>;
}
