//! Account balance abstractions

use async_trait::async_trait;
use thiserror::Error;

/// Number of wei in one ether.
pub const WEI_PER_ETHER: f64 = 1e18;

#[derive(Debug, Error)]
pub enum BalanceError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("failed to connect: {0}")]
    Connect(String),
    #[error("failed to retrieve balance: {0}")]
    Retrieval(String),
}

#[async_trait]
pub trait BalanceProvider: Send + Sync {
    /// Returns the balance of `address` at the latest block, in wei.
    async fn balance_wei(&self, address: &str) -> Result<u128, BalanceError>;
}

/// Converts a wei amount to ether. This is the only place the 10^18 divisor
/// is applied.
pub fn wei_to_ether(wei: u128) -> f64 {
    wei as f64 / WEI_PER_ETHER
}

/// Accepts a 20-byte hex address with or without a `0x` prefix and returns
/// it lowercased with the prefix.
pub fn normalize_address(address: &str) -> Result<String, BalanceError> {
    let hex = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .unwrap_or(address);

    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(BalanceError::InvalidAddress(address.to_string()));
    }

    Ok(format!("0x{}", hex.to_ascii_lowercase()))
}
