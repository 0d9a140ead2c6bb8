//! geodash-api - territorial dashboard backend
//!
//! Loads the geography file, then serves the dashboard endpoints until
//! Ctrl-C or SIGTERM.

use anyhow::{Context, Result};
use clap::Parser;
use geodash_common::config::{self, ConfigSource, FranceTravailCredentials};
use geodash_common::GeoIndex;
use geodash_api::provider::HttpDataProvider;
use geodash_api::{build_router, AppState};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for geodash-api
#[derive(Parser, Debug)]
#[command(name = "geodash-api")]
#[command(about = "Territorial dashboard backend")]
#[command(version)]
struct Args {
    /// TOML config file (default: ./geodash.toml)
    #[arg(short, long, env = "GEODASH_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "GEODASH_PORT")]
    port: Option<u16>,

    /// Address to bind (overrides config)
    #[arg(short, long, env = "GEODASH_BIND")]
    bind: Option<String>,

    /// Geography CSV file (overrides config)
    #[arg(short, long, env = "GEODASH_GEO_FILE")]
    geo_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = config::resolve_config_path(args.config.as_deref());
    // Loaded before tracing so the log level can come from the file;
    // the outcome is reported once tracing is up
    let loaded = config::load_toml_config(&config_path);
    let log_level = loaded
        .as_ref()
        .map(|(c, _)| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("geodash_api={0},geodash_common={0},tower_http=info", log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting geodash-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let (toml_config, source) = loaded.context("Failed to load configuration")?;
    match &source {
        ConfigSource::File(path) => info!("Loaded configuration from {}", path.display()),
        ConfigSource::Defaults(path) => {
            warn!("Config file {} not found, using built-in defaults", path.display())
        }
    }

    let geo_path = config::resolve_geo_file(args.geo_file.as_deref(), &toml_config);
    let geo = match GeoIndex::load(&geo_path) {
        Ok(index) => Arc::new(index),
        Err(e) => {
            error!("Failed to load geography file {}: {}", geo_path.display(), e);
            return Err(e).context("Geography index is required");
        }
    };

    let provider = HttpDataProvider::new(
        toml_config.upstream.clone(),
        FranceTravailCredentials::from_env(),
    )
    .context("Failed to create upstream provider")?;

    let state = AppState::new(geo, Arc::new(provider));
    let app = build_router(state, &toml_config.server.cors_origins);

    let bind = args.bind.unwrap_or(toml_config.server.bind);
    let port = args.port.unwrap_or(toml_config.server.port);
    let addr = format!("{}:{}", bind, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("geodash-api listening on http://{}", addr);
    info!("Health check: http://{}/dashboard/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
