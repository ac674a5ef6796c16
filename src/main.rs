use anyhow::Result;
use clap::{Parser, Subcommand};
use coinrate::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for coinrate::AppCommand {
    fn from(cmd: Commands) -> coinrate::AppCommand {
        match cmd {
            Commands::Serve => coinrate::AppCommand::Serve,
            Commands::Setup => coinrate::AppCommand::Setup,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the rates HTTP service (default)
    Serve,
    /// Create default configuration, at --config-path if given
    Setup,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let command = cli.command.unwrap_or(Commands::Serve);
    let result = coinrate::run_command(command.into(), cli.config_path.as_deref()).await;

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
