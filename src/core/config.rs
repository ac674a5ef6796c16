use anyhow::{Context, Result, ensure};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CoingeckoProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EthereumProviderConfig {
    pub rpc_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub coingecko: Option<CoingeckoProviderConfig>,
    pub ethereum: Option<EthereumProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            coingecko: Some(CoingeckoProviderConfig {
                base_url: "https://api.coingecko.com/api/v3".to_string(),
            }),
            ethereum: Some(EthereumProviderConfig {
                rpc_url: "https://ethereum-rpc.publicnode.com".to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct UpdaterConfig {
    pub interval_secs: u64,
    pub assets: Vec<String>,
    pub fiats: Vec<String>,
    pub history_window_hours: i64,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        UpdaterConfig {
            interval_secs: 300,
            assets: vec![
                "bitcoin".to_string(),
                "ethereum".to_string(),
                "litecoin".to_string(),
            ],
            fiats: vec!["usd".to_string(), "eur".to_string(), "gbp".to_string()],
            history_window_hours: 24,
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub updater: UpdaterConfig,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            server: ServerConfig::default(),
            providers: ProvidersConfig::default(),
            updater: UpdaterConfig::default(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Upper bound for `updater.history_window_hours`, one year.
pub const MAX_HISTORY_WINDOW_HOURS: i64 = 24 * 365;

impl AppConfig {
    /// Loads the config from the default location, or built-in defaults when
    /// no config file exists there.
    pub fn load() -> Result<Self> {
        let default_path = Self::default_config_path()?;
        if !default_path.exists() {
            debug!(
                "No config at {}, using built-in defaults",
                default_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&default_path)
    }

    /// Loads the config at `path` if given; an explicit path must exist.
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Rejects values the updater and the history store cannot run with.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.updater.interval_secs > 0,
            "updater.interval_secs must be greater than 0"
        );
        ensure!(
            self.request_timeout_secs > 0,
            "request_timeout_secs must be greater than 0"
        );
        ensure!(
            (1..=MAX_HISTORY_WINDOW_HOURS).contains(&self.updater.history_window_hours),
            "updater.history_window_hours must be between 1 and {MAX_HISTORY_WINDOW_HOURS}, got {}",
            self.updater.history_window_hours
        );
        Ok(())
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "coinrate", "coinrate")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn coingecko_base_url(&self) -> &str {
        self.providers
            .coingecko
            .as_ref()
            .map_or("https://api.coingecko.com/api/v3", |p| &p.base_url)
    }

    pub fn ethereum_rpc_url(&self) -> &str {
        self.providers
            .ethereum
            .as_ref()
            .map_or("https://ethereum-rpc.publicnode.com", |p| &p.rpc_url)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.updater.interval_secs)
    }

    /// Falls back to 24 hours for a window that `validate` would reject.
    pub fn history_window(&self) -> chrono::Duration {
        chrono::TimeDelta::try_hours(self.updater.history_window_hours)
            .filter(|window| *window > chrono::TimeDelta::zero())
            .unwrap_or_else(|| chrono::TimeDelta::hours(24))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
