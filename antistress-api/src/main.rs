//! antistress-api - worker stress level prediction service
//!
//! Startup order: tracing, build identification, configuration, classifier
//! artifact, database pool, HTTP listener. Any failure before the listener is
//! up stops the process.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use antistress_api::db::{self, PgWorkerStore};
use antistress_api::model::ForestClassifier;
use antistress_api::prediction::StressPredictor;
use antistress_api::{build_router, AppState};
use antistress_common::config::{ConfigLayer, ServiceConfig};
use antistress_common::Locale;
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for antistress-api
///
/// Every option can also come from the environment or the TOML config file.
#[derive(Parser, Debug)]
#[command(name = "antistress-api")]
#[command(about = "Worker stress level prediction service")]
#[command(version)]
struct Args {
    /// TOML config file (default: ./antistress.toml if present)
    #[arg(short, long, env = "ANTISTRESS_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, env = "ANTISTRESS_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "ANTISTRESS_PORT")]
    port: Option<u16>,

    /// Database user
    #[arg(long, env = "DB_USERNAME")]
    db_username: Option<String>,

    /// Database password
    #[arg(long, env = "DB_PASSWORD", hide_env_values = true)]
    db_password: Option<String>,

    /// Database host
    #[arg(long, env = "DB_HOST")]
    db_host: Option<String>,

    /// Database port
    #[arg(long, env = "DB_PORT")]
    db_port: Option<u16>,

    /// Database name
    #[arg(long, env = "DB_NAME")]
    db_name: Option<String>,

    /// Maximum pooled database connections
    #[arg(long, env = "DB_MAX_CONNECTIONS")]
    db_max_connections: Option<u32>,

    /// Trained classifier artifact
    #[arg(short, long, env = "ANTISTRESS_MODEL")]
    model_path: Option<PathBuf>,

    /// Language of messages and stress labels (en, ru)
    #[arg(long, env = "ANTISTRESS_LOCALE")]
    locale: Option<Locale>,
}

impl Args {
    fn into_layer(self) -> (ConfigLayer, Option<PathBuf>) {
        let layer = ConfigLayer {
            host: self.host,
            port: self.port,
            db_username: self.db_username,
            db_password: self.db_password,
            db_host: self.db_host,
            db_port: self.db_port,
            db_name: self.db_name,
            db_max_connections: self.db_max_connections,
            model_path: self.model_path,
            locale: self.locale,
        };
        (layer, self.config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "antistress_api=info,antistress_common=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Antistress API v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let (overrides, config_file) = Args::parse().into_layer();
    let config = ServiceConfig::resolve(overrides, config_file.as_deref())
        .context("Invalid configuration")?;
    info!("Message locale: {}", config.locale);

    // Loaded once, shared read-only by every request
    let classifier = ForestClassifier::load(&config.model_path)
        .context("Failed to load classifier artifact")?;
    let predictor = StressPredictor::new(Arc::new(classifier), config.locale);

    let pool = db::connect(&config.database).await?;
    info!(
        "✓ Connected to database {} at {}:{} as {}",
        config.database.name, config.database.host, config.database.port, config.database.username
    );

    let store = PgWorkerStore::new(pool.clone());
    let app = build_router(AppState::new(Arc::new(store), predictor));

    let address = config.listen_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind to {}", address))?;
    info!("antistress-api listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
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
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
