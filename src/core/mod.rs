//! Core business logic abstractions

pub mod balance;
pub mod config;
pub mod log;
pub mod rates;

// Re-export main types for cleaner imports
pub use balance::{BalanceError, BalanceProvider, wei_to_ether};
pub use rates::{FiatRates, LookupError, RateProvider, RateSample, RateSnapshot};
