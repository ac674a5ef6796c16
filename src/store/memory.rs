use crate::core::rates::{FiatRates, LookupError, RateSample, RateSnapshot};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

type SeriesKey = (String, String);

/// In-memory store of the latest rate snapshot and per-pair rate history.
///
/// The snapshot is swapped as a whole behind an `Arc`, so a reader holds the
/// lock only long enough to clone the pointer. History lives behind its own
/// lock; the two are not updated atomically with each other.
pub struct RateStore {
    snapshot: RwLock<Arc<RateSnapshot>>,
    history: RwLock<HashMap<SeriesKey, VecDeque<RateSample>>>,
    retention: chrono::Duration,
}

impl RateStore {
    /// Creates an empty store. Samples older than `retention` relative to the
    /// newest sample of a series are dropped on append; the newest sample is
    /// always kept.
    pub fn new(retention: chrono::Duration) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(RateSnapshot::new())),
            history: RwLock::new(HashMap::new()),
            retention,
        }
    }

    pub async fn replace_snapshot(&self, snapshot: RateSnapshot) {
        let snapshot = Arc::new(snapshot);
        let mut current = self.snapshot.write().await;
        *current = snapshot;
        debug!(assets = current.len(), "Snapshot replaced");
    }

    pub async fn snapshot(&self) -> Arc<RateSnapshot> {
        Arc::clone(&*self.snapshot.read().await)
    }

    /// Appends one sample stamped `timestamp` for every (asset, fiat) pair in
    /// the current snapshot. Returns the number of samples appended.
    pub async fn append_history(&self, timestamp: i64) -> usize {
        let snapshot = self.snapshot().await;
        let cutoff = timestamp - self.retention.num_seconds();

        let mut history = self.history.write().await;
        let mut appended = 0;
        for (asset, rates) in snapshot.iter() {
            for (fiat, rate) in rates {
                let series = history
                    .entry((asset.clone(), fiat.clone()))
                    .or_default();
                series.push_back(RateSample {
                    timestamp,
                    rate: *rate,
                });
                while series.len() > 1 && series.front().is_some_and(|s| s.timestamp <= cutoff) {
                    series.pop_front();
                }
                appended += 1;
            }
        }
        debug!(appended, "History appended");
        appended
    }

    pub async fn rate(&self, asset: &str, fiat: &str) -> Result<f64, LookupError> {
        let snapshot = self.snapshot().await;
        lookup(&snapshot, asset, fiat)
    }

    pub async fn asset_rates(&self, asset: &str) -> Result<FiatRates, LookupError> {
        let snapshot = self.snapshot().await;
        snapshot
            .get(asset)
            .cloned()
            .ok_or(LookupError::AssetNotFound)
    }

    /// Returns the current rate for the pair and its samples newer than
    /// `cutoff`, oldest first.
    pub async fn history_since(
        &self,
        asset: &str,
        fiat: &str,
        cutoff: i64,
    ) -> Result<(f64, Vec<RateSample>), LookupError> {
        let rate = self.rate(asset, fiat).await?;

        let history = self.history.read().await;
        let series = history
            .get(&(asset.to_string(), fiat.to_string()))
            .ok_or(LookupError::HistoryNotFound)?;
        let samples = series
            .iter()
            .filter(|s| s.timestamp > cutoff)
            .copied()
            .collect();

        Ok((rate, samples))
    }

    #[cfg(test)]
    pub(crate) async fn series_len(&self, asset: &str, fiat: &str) -> usize {
        let history = self.history.read().await;
        history
            .get(&(asset.to_string(), fiat.to_string()))
            .map_or(0, VecDeque::len)
    }
}

impl Default for RateStore {
    fn default() -> Self {
        Self::new(chrono::Duration::hours(24))
    }
}

fn lookup(snapshot: &RateSnapshot, asset: &str, fiat: &str) -> Result<f64, LookupError> {
    let rates = snapshot.get(asset).ok_or(LookupError::AssetNotFound)?;
    rates.get(fiat).copied().ok_or(LookupError::FiatNotFound)
}
