//! Hub server binary
//!
//! Serves the hub's REST API. Configuration comes from an optional YAML file
//! (`--config`, with any `--overlay` files merged over it), with the listener
//! and database overridable from the command line or environment.

use anyhow::Context;
use clap::Parser;
use hub::api::{create_router, AppState};
use hub::config::HubConfig;
use hub::Hub;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "hub-server", version, about = "Workflow orchestration hub server")]
struct Args {
    /// YAML configuration file
    #[arg(short, long, env = "HUB_CONFIG")]
    config: Option<std::path::PathBuf>,

    /// Files merged over `--config` in order, e.g. a local override
    #[arg(long, requires = "config")]
    overlay: Vec<std::path::PathBuf>,

    /// Listen address, overrides `server.host`
    #[arg(long, env = "HUB_HOST")]
    host: Option<String>,

    /// Listen port, overrides `server.port`
    #[arg(short, long, env = "HUB_PORT")]
    port: Option<u16>,

    /// SQLite connection string, overrides `database.url`
    #[arg(long, env = "HUB_DATABASE_URL")]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            let overlays: Vec<&std::path::Path> = args.overlay.iter().map(|p| p.as_path()).collect();
            HubConfig::load_layered(path.as_path(), &overlays)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => {
            tracing::info!("No configuration file given, using environment and defaults");
            HubConfig::from_env()
        }
    };
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(url) = args.database_url {
        config.database.url = Some(url);
    }

    let hub = Hub::from_config(&config)
        .await
        .context("Failed to assemble hub")?;

    let resumed = hub.resume_active().await?;
    tracing::info!(resumed, "Active workflows rescheduled");

    let app = create_router(AppState::new(hub));

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Hub server listening on {}", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Hub server shut down gracefully");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl-C, shutting down");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
