//! Whatomate server binary.
//!
//! Resolves configuration and verifies both backends. Request serving is not
//! implemented yet, so the process exits once startup has succeeded.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use whatomate_backend::LiveConnector;
use whatomate_config::{ProcessEnv, DEFAULT_CONFIG_PATH};
use whatomate_server::bootstrap;

/// Whatomate server.
#[derive(Parser, Debug)]
#[command(name = "whatomate-server")]
#[command(about = "Resolve configuration and verify backend connections")]
#[command(version)]
struct Cli {
    /// Configuration file used when no platform environment is detected.
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialise tracing
    let filter = if cli.verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    info!("Whatomate server starting");

    let ready = match bootstrap(&ProcessEnv, &cli.config, &LiveConnector).await {
        Ok(ready) => ready,
        Err(e) => {
            error!(stage = %e.stage(), error = %e, "Startup failed");
            return ExitCode::FAILURE;
        }
    };

    info!(
        mode = %ready.mode,
        host = %ready.config.server.host,
        port = %ready.port,
        database_connections = ready.store.pool().size(),
        cache = ?ready.cache,
        "Backends verified"
    );

    // TODO: hand the handles to the HTTP API once it exists instead of exiting.
    info!(port = %ready.port, "Request serving not implemented yet, shutting down");

    ready.cache.close();
    ready.store.close().await;

    ExitCode::SUCCESS
}
