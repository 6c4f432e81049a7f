//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own, without the relation-sync worker.
//!
//! ## Intended use
//! Useful for development and debugging when you only want the REST server (with
//! OpenAPI/Swagger UI). The workspace's main `drc-run` binary also synchronises relations with
//! remote registries.

use api_shared::ClientRegistry;
use drc_api_rest::{create_router, AppState};
use drc_core::constants::DEFAULT_DATA_DIR;
use drc_core::{fetch_timeout_from_env_value, CoreConfig};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the DRC REST API server
///
/// # Environment Variables
/// - `DRC_REST_ADDR`: Server address (default: "0.0.0.0:8000")
/// - `DRC_DATA_DIR`: Data directory (default: "drc_data"; must exist)
/// - `DRC_BASE_URL`: Public base URL (default: "http://localhost:8000")
/// - `DRC_API_KEYS`: Client registry (`key=scope,scope;key2=*`)
/// - `DRC_FETCH_TIMEOUT_SECS`: Remote fetch timeout (default: 10)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is invalid or the data directory is missing,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("drc_api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("DRC_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".into());

    tracing::info!("-- Starting DRC REST API on {}", addr);

    let data_dir = std::env::var("DRC_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.into());
    let data_path = Path::new(&data_dir);
    if !data_path.exists() {
        anyhow::bail!("DRC data directory does not exist: {}", data_path.display());
    }

    let base_url =
        std::env::var("DRC_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".into());
    let fetch_timeout = fetch_timeout_from_env_value(std::env::var("DRC_FETCH_TIMEOUT_SECS").ok())?;
    let clients =
        ClientRegistry::from_config_value(&std::env::var("DRC_API_KEYS").unwrap_or_default())?;

    let cfg = Arc::new(CoreConfig::new(
        data_path.to_path_buf(),
        base_url,
        fetch_timeout,
        false,
    )?);

    let state = AppState::with_http_fetcher(cfg, clients, None)?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
