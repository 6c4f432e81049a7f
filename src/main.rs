use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_shared::ClientRegistry;
use drc_api_rest::{AppState, create_router};
use drc_core::constants::{DEFAULT_DATA_DIR, DEFAULT_SYNC_QUEUE_CAPACITY};
use drc_core::sync::{RelationSync, RemoteRegistrySync, channel, run_sync_worker};
use drc_core::{CoreConfig, fetch_timeout_from_env_value, flag_from_env_value};

/// Main entry point for the DRC application
///
/// Starts the REST server and, unless disabled, the worker that pushes relation changes to the
/// registries holding the related zaken and besluiten.
///
/// # Environment Variables
/// - `DRC_REST_ADDR`: REST server address (default: "0.0.0.0:8000")
/// - `DRC_DATA_DIR`: Directory for the record store (default: "drc_data"; must exist)
/// - `DRC_BASE_URL`: Public base URL used in resource URLs (default: "http://localhost:8000")
/// - `DRC_API_KEYS`: Client registry, `key=scope,scope;key2=*`
/// - `DRC_FETCH_TIMEOUT_SECS`: Timeout for remote fetches (default: 10)
/// - `DRC_SYNC_ENABLED`: Whether relation changes are synchronised (default: true)
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, startup or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("drc=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("DRC_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".into());

    tracing::info!("++ Starting DRC REST on {}", rest_addr);

    let data_dir = std::env::var("DRC_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.into());
    let data_path = Path::new(&data_dir);
    if !data_path.exists() {
        anyhow::bail!("DRC data directory does not exist: {}", data_path.display());
    }

    let base_url = std::env::var("DRC_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".into());
    let fetch_timeout = fetch_timeout_from_env_value(std::env::var("DRC_FETCH_TIMEOUT_SECS").ok())?;
    let sync_enabled = flag_from_env_value(std::env::var("DRC_SYNC_ENABLED").ok(), true)?;
    let clients = ClientRegistry::from_config_value(&std::env::var("DRC_API_KEYS").unwrap_or_default())?;

    let cfg = Arc::new(CoreConfig::new(
        data_path.to_path_buf(),
        base_url,
        fetch_timeout,
        sync_enabled,
    )?);

    let events = if cfg.sync_enabled() {
        let (publisher, rx) = channel(DEFAULT_SYNC_QUEUE_CAPACITY);
        let sync: Arc<dyn RelationSync> = Arc::new(RemoteRegistrySync::new(cfg.fetch_timeout())?);
        tokio::spawn(run_sync_worker(rx, sync));
        Some(publisher)
    } else {
        tracing::info!("-- Relation synchronisation disabled");
        None
    };

    let state = AppState::with_http_fetcher(cfg, clients, events)?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
