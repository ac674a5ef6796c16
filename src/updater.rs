use anyhow::{Result, anyhow};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval, timeout};
use tracing::{info, warn};

use crate::core::rates::RateProvider;
use crate::store::RateStore;

/// Periodically refreshes the rate snapshot and records history samples.
pub struct RateUpdater {
    provider: Arc<dyn RateProvider>,
    store: Arc<RateStore>,
    assets: Vec<String>,
    fiats: Vec<String>,
    interval: Duration,
    fetch_timeout: Duration,
}

impl RateUpdater {
    pub fn new(
        provider: Arc<dyn RateProvider>,
        store: Arc<RateStore>,
        assets: Vec<String>,
        fiats: Vec<String>,
    ) -> Self {
        Self {
            provider,
            store,
            assets,
            fiats,
            interval: Duration::from_secs(5 * 60),
            fetch_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    /// Runs a single fetch/replace/append cycle and returns the number of
    /// history samples appended. On error the store is left untouched.
    pub async fn run_cycle(&self) -> Result<usize> {
        let snapshot = timeout(
            self.fetch_timeout,
            self.provider.fetch_rates(&self.assets, &self.fiats),
        )
        .await
        .map_err(|_| anyhow!("Rate fetch timed out after {:?}", self.fetch_timeout))??;

        self.store.replace_snapshot(snapshot).await;
        let appended = self.store.append_history(Utc::now().timestamp()).await;
        Ok(appended)
    }

    /// Loops forever. The first cycle runs immediately.
    pub async fn run(self) {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match self.run_cycle().await {
                Ok(appended) => info!(appended, "Exchange rates updated"),
                Err(e) => warn!(error = %e, "Failed to update exchange rates"),
            }
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
