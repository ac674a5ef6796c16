use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Targets that log at the chosen level when `RUST_LOG` is unset. Everything
/// else logs at `warn`.
const APP_TARGETS: [&str; 2] = ["coinrate", "tower_http"];

fn default_directives(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    APP_TARGETS
        .iter()
        .fold("warn".to_string(), |acc, target| format!("{acc},{target}={level}"))
}

/// Installs the global subscriber. `RUST_LOG`, when set, replaces the
/// defaults entirely.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}
