//! Kabox server
//!
//! Main entry point for the Kabox file relay service.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use kabox_api::{AppState, create_router};
use kabox_core::registry::{InMemoryRegistry, MetadataRegistry};
use kabox_core::storage::{StorageConfig, StorageProvider, StorageService};
use kabox_core::upload::{RemoteFetcher, UploadLimits};
use kabox_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    // Load configuration
    let config = AppConfig::load()?;

    // Object store
    let provider = StorageProvider::from_settings(&config.storage)?;
    let storage = StorageService::from_config(StorageConfig::new(provider))?;
    info!(
        provider = storage.provider_name(),
        bucket = storage.bucket(),
        "Storage service configured"
    );

    // Upload limits and remote fetcher
    let limits = UploadLimits::from(&config.upload);
    let fetcher = RemoteFetcher::new(
        config.upload.fetch_timeout_secs.map(Duration::from_secs),
        limits.max_file_size,
    )?;
    info!(
        max_files = limits.max_files,
        max_file_size = limits.max_file_size,
        "Upload limits configured"
    );

    let public_base_url = config.server.public_base_url().map(str::to_string);
    match &public_base_url {
        Some(base) => info!(base_url = %base, "Using configured public base URL"),
        None => info!("Deriving public base URL from request headers"),
    }

    // Create application state
    let registry: Arc<dyn MetadataRegistry> = Arc::new(InMemoryRegistry::new());
    let state = AppState::new(
        Arc::new(storage),
        registry,
        fetcher,
        limits,
        public_base_url,
    );

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Install the global subscriber. `LOG_FORMAT=json` selects JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "kabox=debug,tower_http=debug".into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
