pub mod coingecko;
pub mod ethereum;

pub use coingecko::CoingeckoProvider;
pub use ethereum::EthereumRpcProvider;
