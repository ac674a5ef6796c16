use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::balance::{BalanceError, BalanceProvider, normalize_address};

/// Queries account balances from an Ethereum node over JSON-RPC.
///
/// A single `reqwest::Client` is held for the life of the provider so its
/// connection pool is shared by every request.
pub struct EthereumRpcProvider {
    rpc_url: String,
    client: reqwest::Client,
}

impl EthereumRpcProvider {
    pub fn new(rpc_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("coinrate/0.1")
            .timeout(timeout)
            .build()?;
        Ok(EthereumRpcProvider {
            rpc_url: rpc_url.to_string(),
            client,
        })
    }
}

#[derive(Serialize, Debug)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: [&'a str; 2],
}

#[derive(Deserialize, Debug)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize, Debug)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

fn parse_quantity(quantity: &str) -> Result<u128, BalanceError> {
    let digits = quantity
        .strip_prefix("0x")
        .ok_or_else(|| BalanceError::Retrieval(format!("quantity is not hex: {quantity}")))?;
    u128::from_str_radix(digits, 16)
        .map_err(|e| BalanceError::Retrieval(format!("invalid quantity {quantity}: {e}")))
}

#[async_trait]
impl BalanceProvider for EthereumRpcProvider {
    #[instrument(name = "EthGetBalance", skip(self), fields(address = %address))]
    async fn balance_wei(&self, address: &str) -> Result<u128, BalanceError> {
        let address = normalize_address(address)?;
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method: "eth_getBalance",
            params: [address.as_str(), "latest"],
        };
        debug!("Requesting balance from {}", self.rpc_url);

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    BalanceError::Connect(e.to_string())
                } else {
                    BalanceError::Retrieval(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(BalanceError::Retrieval(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| BalanceError::Retrieval(format!("malformed response: {e}")))?;
        debug!(response = ?body, "Received RPC response");

        if let Some(err) = body.error {
            return Err(BalanceError::Retrieval(format!(
                "rpc error {}: {}",
                err.code, err.message
            )));
        }

        let quantity = body
            .result
            .ok_or_else(|| BalanceError::Retrieval("response has no result".to_string()))?;
        parse_quantity(&quantity)
    }
}
