use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::core::rates::{FiatRates, RateProvider, RateSnapshot};

/// CoinGecko-backed rate provider using the `/simple/price` endpoint.
pub struct CoingeckoProvider {
    base_url: String,
    client: reqwest::Client,
}

impl CoingeckoProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("coinrate/0.1")
            .timeout(timeout)
            .build()?;
        Ok(CoingeckoProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

type SimplePriceResponse = HashMap<String, HashMap<String, f64>>;

#[async_trait]
impl RateProvider for CoingeckoProvider {
    #[instrument(name = "CoingeckoRatesFetch", skip(self))]
    async fn fetch_rates(&self, assets: &[String], fiats: &[String]) -> Result<RateSnapshot> {
        let ids = assets.join(",");
        let url = format!(
            "{}/simple/price?ids={}&vs_currencies={}",
            self.base_url,
            ids,
            fiats.join(",")
        );
        debug!("Requesting rates from {}", url);

        let response = self
            .client
            .get(&url)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} URL: {}", e, url))?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP error: {} for URL: {}", response.status(), url));
        }

        let text = response.text().await?;
        let data: SimplePriceResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse rates response: {}", e))?;

        let mut snapshot = RateSnapshot::new();
        for asset in assets {
            let Some(quotes) = data.get(asset) else {
                warn!(%asset, "Asset missing from rates response");
                continue;
            };

            let rates: FiatRates = fiats
                .iter()
                .filter_map(|fiat| {
                    let rate = quotes.get(fiat).copied()?;
                    if rate.is_finite() && rate > 0.0 {
                        Some((fiat.clone(), rate))
                    } else {
                        warn!(%asset, %fiat, rate, "Discarding non-positive rate");
                        None
                    }
                })
                .collect();

            if !rates.is_empty() {
                snapshot.insert(asset.clone(), rates);
            }
        }

        if snapshot.is_empty() {
            return Err(anyhow!("No rates found for assets: {}", ids));
        }

        Ok(snapshot)
    }
}
