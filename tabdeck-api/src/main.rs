//! tabdeck-api - REST service for the tab/component document
//!
//! Serves the document store over HTTP along with the question classifier
//! and keyword detector endpoints.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tabdeck_api::services::{Classifier, OpenAiClassifier};
use tabdeck_api::{build_router, AppState};
use tabdeck_common::config::{load_toml_config, ConfigOverrides, ConfigSource, ServiceConfig};
use tabdeck_common::{DocumentStore, TabService};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for tabdeck-api
#[derive(Parser, Debug)]
#[command(name = "tabdeck-api")]
#[command(about = "Tab/component document service")]
#[command(version)]
struct Args {
    /// Address to bind
    #[arg(long, env = "TABDECK_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "TABDECK_PORT")]
    port: Option<u16>,

    /// JSON document backing the store
    #[arg(short, long, env = "TABDECK_DATA_FILE")]
    data_file: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, env = "TABDECK_CONFIG")]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is not set
    #[arg(long, env = "TABDECK_LOG_LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (toml_config, config_source) = load_toml_config(args.config.as_deref())
        .context("Failed to load configuration")?;
    let config = ServiceConfig::resolve(
        toml_config,
        ConfigOverrides {
            host: args.host,
            port: args.port,
            data_file: args.data_file,
            log_level: args.log_level,
        },
    );

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting tabdeck-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config_source {
        ConfigSource::File(path) => info!("Loaded configuration from {}", path.display()),
        ConfigSource::Ignored { path, reason } => {
            warn!("Ignoring unreadable config file {}: {}", path.display(), reason)
        }
        ConfigSource::Defaults => info!("No config file found, using defaults"),
    }
    info!("Document: {}", config.data_file.display());

    let store = Arc::new(DocumentStore::new(config.data_file.clone()));
    // Surface permission problems at startup rather than on the first request
    let document = store
        .load()
        .await
        .context("Failed to read document")?;
    info!(
        "Document has {} tabs, {} components",
        document.tabs.len(),
        document.component_count()
    );

    let classifier = OpenAiClassifier::new(&config.llm).context("Failed to build LLM client")?;
    if classifier.is_configured() {
        info!("LLM classifier: model {} at {}", config.llm.model, config.llm.base_url);
    } else {
        warn!("OPENAI_API_KEY not set; /api/question will fail until configured");
    }
    let classifier: Arc<dyn Classifier> = Arc::new(classifier);

    let state = AppState::new(TabService::new(store), classifier);
    let app = build_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("tabdeck-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

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
            warn!("Failed to listen for Ctrl+C: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
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
