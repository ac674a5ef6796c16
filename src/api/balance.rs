use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use super::AppState;
use super::error::ApiResult;
use crate::core::balance::{normalize_address, wei_to_ether};

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub address: String,
    /// Balance in ether.
    pub balance: f64,
}

pub async fn get_balance(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> ApiResult<Json<BalanceResponse>> {
    let address = normalize_address(&address)?;
    let wei = state.balances.balance_wei(&address).await?;
    Ok(Json(BalanceResponse {
        address,
        balance: wei_to_ether(wei),
    }))
}
