//! HTTP surface over the rate store and the balance provider.

pub mod balance;
pub mod error;
pub mod rates;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::core::balance::BalanceProvider;
use crate::store::RateStore;

/// Shared handler state, passed to all routes via `axum::extract::State`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RateStore>,
    pub balances: Arc<dyn BalanceProvider>,
    pub history_window: chrono::Duration,
}

impl AppState {
    pub fn new(store: Arc<RateStore>, balances: Arc<dyn BalanceProvider>) -> Self {
        Self {
            store,
            balances,
            history_window: chrono::Duration::hours(24),
        }
    }

    pub fn with_history_window(mut self, history_window: chrono::Duration) -> Self {
        self.history_window = history_window;
        self
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/rates", get(rates::get_all_rates))
        .route("/rates/{asset}", get(rates::get_asset_rates))
        .route("/rates/{asset}/{fiat}", get(rates::get_rate))
        .route("/rates/history/{asset}/{fiat}", get(rates::get_rate_history))
        .route("/balance/{address}", get(balance::get_balance))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::balance::{BalanceError, normalize_address};
    use crate::core::rates::RateSnapshot;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use chrono::Utc;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    /// Returns a fixed wei balance, or a fixed failure.
    #[derive(Clone, Copy)]
    enum FixedBalance {
        Wei(u128),
        Unreachable,
        RpcFailure,
    }

    #[async_trait]
    impl BalanceProvider for FixedBalance {
        async fn balance_wei(&self, address: &str) -> Result<u128, BalanceError> {
            normalize_address(address)?;
            match self {
                FixedBalance::Wei(wei) => Ok(*wei),
                FixedBalance::Unreachable => Err(BalanceError::Connect("refused".to_string())),
                FixedBalance::RpcFailure => Err(BalanceError::Retrieval("rpc error".to_string())),
            }
        }
    }

    fn seeded_snapshot() -> RateSnapshot {
        serde_json::from_value(json!({
            "bitcoin": {"usd": 64123.45, "eur": 59000.1, "gbp": 50500.0},
            "ethereum": {"usd": 3100.5, "eur": 2850.25, "gbp": 2440.0}
        }))
        .unwrap()
    }

    async fn seeded_state(balance: FixedBalance) -> AppState {
        let store = Arc::new(RateStore::default());
        store.replace_snapshot(seeded_snapshot()).await;
        AppState::new(store, Arc::new(balance))
    }

    async fn get_json(state: AppState, uri: &str) -> (StatusCode, Value) {
        let response = app_router(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_get_rate() {
        let state = seeded_state(FixedBalance::Wei(0)).await;

        let (status, body) = get_json(state, "/rates/bitcoin/usd").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"asset": "bitcoin", "fiat": "usd", "rate": 64123.45})
        );
    }

    #[tokio::test]
    async fn test_get_rate_not_found() {
        let state = seeded_state(FixedBalance::Wei(0)).await;

        let (status, body) = get_json(state.clone(), "/rates/dogecoin/usd").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "asset not found"}));

        let (status, body) = get_json(state, "/rates/bitcoin/jpy").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "fiat not found"}));
    }

    #[tokio::test]
    async fn test_get_asset_rates() {
        let state = seeded_state(FixedBalance::Wei(0)).await;

        let (status, body) = get_json(state.clone(), "/rates/ethereum").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "asset": "ethereum",
                "rates": {"usd": 3100.5, "eur": 2850.25, "gbp": 2440.0}
            })
        );

        let (status, body) = get_json(state, "/rates/litecoin").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "asset not found"}));
    }

    #[tokio::test]
    async fn test_get_all_rates() {
        let empty = AppState::new(Arc::new(RateStore::default()), Arc::new(FixedBalance::Wei(0)));
        let (status, body) = get_json(empty, "/rates").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"rates": {}}));

        let state = seeded_state(FixedBalance::Wei(0)).await;
        let (status, body) = get_json(state, "/rates").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rates"]["bitcoin"]["gbp"], json!(50500.0));
        assert_eq!(body["rates"]["ethereum"]["usd"], json!(3100.5));
    }

    #[tokio::test]
    async fn test_get_rate_history() {
        let state = seeded_state(FixedBalance::Wei(0)).await;
        let now = Utc::now().timestamp();
        state.store.append_history(now - 25 * 3600).await;
        state.store.append_history(now - 60).await;

        let (status, body) = get_json(state, "/rates/history/bitcoin/usd").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "asset": "bitcoin",
                "fiat": "usd",
                "rate": 64123.45,
                "history": [{"timestamp": now - 60, "rate": 64123.45}]
            })
        );
    }

    #[tokio::test]
    async fn test_get_rate_history_not_found() {
        let state = seeded_state(FixedBalance::Wei(0)).await;

        let (status, body) = get_json(state.clone(), "/rates/history/bitcoin/usd").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "history not found"}));

        let (status, body) = get_json(state.clone(), "/rates/history/dogecoin/usd").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "asset not found"}));

        let (status, body) = get_json(state, "/rates/history/bitcoin/jpy").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "fiat not found"}));
    }

    #[tokio::test]
    async fn test_get_balance_converts_once() {
        let state = seeded_state(FixedBalance::Wei(1_000_000_000_000_000_000)).await;

        let (status, body) = get_json(
            state,
            "/balance/0x00000000219ab540356cbb839cbe05303d7705fa",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "address": "0x00000000219ab540356cbb839cbe05303d7705fa",
                "balance": 1.0
            })
        );
    }

    #[tokio::test]
    async fn test_get_balance_echoes_normalized_address() {
        let state = seeded_state(FixedBalance::Wei(2_500_000_000_000_000_000)).await;

        let (status, body) = get_json(
            state,
            "/balance/00000000219AB540356CBB839CBE05303D7705FA",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "address": "0x00000000219ab540356cbb839cbe05303d7705fa",
                "balance": 2.5
            })
        );
    }

    #[tokio::test]
    async fn test_get_balance_failures() {
        let address = "/balance/0x00000000219ab540356cbb839cbe05303d7705fa";

        let state = seeded_state(FixedBalance::Unreachable).await;
        let (status, body) = get_json(state, address).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "failed to connect"}));

        let state = seeded_state(FixedBalance::RpcFailure).await;
        let (status, body) = get_json(state, address).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "failed to retrieve balance"}));

        let state = seeded_state(FixedBalance::Wei(0)).await;
        let (status, body) = get_json(state, "/balance/0x1234").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "invalid address"}));
    }
}
