//! Skipper command-line entry point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use skipper::config::CONFIG_PATH_ENV;
use skipper::{Config, Error, Skipper};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

/// Chat-ops bot for containerised game servers
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Default)]
enum Commands {
    /// Serve command interactions until interrupted
    #[default]
    Serve,

    /// Register the `server` command group with the configured guild and exit
    InstallCommands,
}

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Skipper exited with an error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let path = cli
        .config
        .ok_or_else(|| Error::MissingEnvironment(CONFIG_PATH_ENV.to_string()))?;

    let config = Config::from_file(&path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    let skipper = Skipper::new(config).context("Failed to initialise Skipper")?;

    match cli.command.unwrap_or_default() {
        Commands::Serve => {
            info!(servers = skipper.config().servers.len(), "Starting Skipper");
            skipper.serve().await.context("Gateway failed")?;
        }
        Commands::InstallCommands => {
            let installed = skipper
                .install_commands()
                .await
                .context("Failed to install commands")?;
            info!(commands = installed, "Commands installed");
        }
    }

    Ok(())
}
