pub mod api;
pub mod cli;
pub mod core;
pub mod providers;
pub mod store;
pub mod updater;

use crate::api::{AppState, app_router};
use crate::core::config::AppConfig;
use crate::providers::{CoingeckoProvider, EthereumRpcProvider};
use crate::store::RateStore;
use crate::updater::RateUpdater;
use anyhow::{Context, Result, anyhow};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info};

pub enum AppCommand {
    Serve,
    Setup,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    match command {
        AppCommand::Serve => run(config_path).await,
        AppCommand::Setup => match config_path {
            Some(path) => cli::setup::setup_at_path(path),
            None => cli::setup::setup(),
        },
    }
}

pub async fn run(config_path: Option<&str>) -> Result<()> {
    info!("Rates service starting...");

    let config = AppConfig::load_or_default(config_path)?;
    debug!("Loaded config: {config:#?}");

    let listener = TcpListener::bind(config.server.listen_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.server.listen_addr))?;

    serve(config, listener, shutdown_signal()).await
}

/// Starts the rate updater and serves the HTTP API on `listener` until
/// `shutdown` resolves. Fails if the updater task stops on its own.
pub async fn serve<F>(config: AppConfig, listener: TcpListener, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    config.validate()?;

    let store = Arc::new(RateStore::new(config.history_window()));
    let rate_provider =
        CoingeckoProvider::new(config.coingecko_base_url(), config.request_timeout())?;
    let balance_provider =
        EthereumRpcProvider::new(config.ethereum_rpc_url(), config.request_timeout())?;

    let updater = RateUpdater::new(
        Arc::new(rate_provider),
        Arc::clone(&store),
        config.updater.assets.clone(),
        config.updater.fiats.clone(),
    )
    .with_interval(config.interval())
    .with_fetch_timeout(config.request_timeout());
    let mut updater_handle = updater.spawn();

    let state = AppState::new(store, Arc::new(balance_provider))
        .with_history_window(config.history_window());

    info!("Listening on {}", listener.local_addr()?);
    let server = async move {
        axum::serve(listener, app_router(state))
            .with_graceful_shutdown(shutdown)
            .await
    };

    let result = tokio::select! {
        served = server => served.context("HTTP server failed"),
        joined = &mut updater_handle => match joined {
            Ok(()) => Err(anyhow!("Rate updater stopped unexpectedly")),
            Err(e) => Err(anyhow!("Rate updater failed: {e}")),
        },
    };

    updater_handle.abort();
    info!("Rates service stopped");
    result
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
