//! crosspost-server - HTTP API for cross-posting to social networks

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crosspost_server::{build_router, AppState};
use libcrosspost::logging::{LogFormat, LoggingConfig};
use libcrosspost::{Config, CrosspostService};
use tracing::{info, warn};

/// How often expired sessions are swept from the database
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[derive(Parser, Debug)]
#[command(name = "crosspost-server")]
#[command(version)]
#[command(about = "Publish one post to LinkedIn, X and Facebook at once")]
#[command(long_about = "\
crosspost-server - HTTP API for cross-posting

DESCRIPTION:
    Serves the JSON API used by the Crosspost web client: sessions,
    connected accounts, publishing, and post history.

USAGE:
    # Run with the default configuration
    crosspost-server

    # Listen on all interfaces with JSON logs
    crosspost-server --bind 0.0.0.0:8080 --log-format json

SIGNALS:
    SIGTERM, SIGINT - Graceful shutdown (in-flight requests finish)

CONFIGURATION:
    Configuration file: ~/.config/crosspost/config.toml
    Override with CROSSPOST_CONFIG or --config.

    [server]
    bind = \"127.0.0.1:5000\"

    [publishing]
    delay = \"500ms\"
")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "CROSSPOST_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Address to listen on (overrides config)
    #[arg(short, long, value_name = "ADDR")]
    bind: Option<String>,

    /// Log output format: text, json, pretty
    #[arg(long, value_name = "FORMAT")]
    log_format: Option<LogFormat>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    LoggingConfig::from_env()
        .with_overrides(cli.log_format, cli.verbose)
        .init();

    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load().context("Failed to load config")?,
    };
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }

    let bind = config.server.bind.clone();
    let service = CrosspostService::from_config(config)
        .await
        .context("Failed to initialize service")?;

    tokio::spawn(sweep_sessions(service.clone()));

    let app = build_router(AppState::new(service));
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind to {}", bind))?;

    info!("crosspost-server listening on http://{}", bind);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server failed")?;

    info!("crosspost-server stopped");
    Ok(())
}

async fn sweep_sessions(service: CrosspostService) {
    let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
    loop {
        interval.tick().await;
        match service.sessions().purge_expired().await {
            Ok(0) => {}
            Ok(purged) => info!(purged, "Purged expired sessions"),
            Err(e) => warn!("Failed to purge expired sessions: {}", e),
        }
    }
}

/// Resolve once SIGINT or SIGTERM arrives
#[cfg(unix)]
async fn shutdown_signal() {
    use futures::stream::StreamExt;
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook_tokio::Signals;

    match Signals::new([SIGINT, SIGTERM]) {
        Ok(mut signals) => {
            if signals.next().await.is_some() {
                info!("Received shutdown signal, stopping gracefully...");
            }
        }
        Err(e) => {
            warn!("Signal setup failed ({}), falling back to Ctrl-C", e);
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl-C: {}", e);
            }
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        return;
    }
    info!("Received Ctrl-C, stopping gracefully...");
}
