use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use serde::Serialize;

use super::AppState;
use super::error::ApiResult;
use crate::core::rates::{FiatRates, RateSample, RateSnapshot};

#[derive(Debug, Serialize)]
pub struct RateResponse {
    pub asset: String,
    pub fiat: String,
    pub rate: f64,
}

#[derive(Debug, Serialize)]
pub struct AssetRatesResponse {
    pub asset: String,
    pub rates: FiatRates,
}

#[derive(Debug, Serialize)]
pub struct AllRatesResponse {
    pub rates: RateSnapshot,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub asset: String,
    pub fiat: String,
    pub rate: f64,
    pub history: Vec<RateSample>,
}

pub async fn get_rate(
    State(state): State<AppState>,
    Path((asset, fiat)): Path<(String, String)>,
) -> ApiResult<Json<RateResponse>> {
    let rate = state.store.rate(&asset, &fiat).await?;
    Ok(Json(RateResponse { asset, fiat, rate }))
}

pub async fn get_asset_rates(
    State(state): State<AppState>,
    Path(asset): Path<String>,
) -> ApiResult<Json<AssetRatesResponse>> {
    let rates = state.store.asset_rates(&asset).await?;
    Ok(Json(AssetRatesResponse { asset, rates }))
}

pub async fn get_all_rates(State(state): State<AppState>) -> Json<AllRatesResponse> {
    Json(AllRatesResponse {
        rates: state.store.snapshot().await.as_ref().clone(),
    })
}

pub async fn get_rate_history(
    State(state): State<AppState>,
    Path((asset, fiat)): Path<(String, String)>,
) -> ApiResult<Json<HistoryResponse>> {
    let cutoff = (Utc::now() - state.history_window).timestamp();
    let (rate, history) = state.store.history_since(&asset, &fiat, cutoff).await?;
    Ok(Json(HistoryResponse {
        asset,
        fiat,
        rate,
        history,
    }))
}
