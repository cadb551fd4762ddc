use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::{net::SocketAddr, path::Path, sync::Arc, time::Duration};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    config::{Config, SpotConfig, StoreConfig},
    handlers, metrics,
    pricing::{CostEngine, HttpSpotMarket, SpotMarket, StubSpotMarket},
    seed::{apply_seed, SeedDocument},
    signals::setup_signal_handlers,
    store::{MemoryPriceStore, PriceStore, RedisPriceStore},
};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<CostEngine>,
    pub store: Arc<dyn PriceStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn PriceStore>, market: Arc<dyn SpotMarket>) -> Self {
        Self {
            engine: Arc::new(CostEngine::new(store.clone(), market)),
            store,
        }
    }
}

/// Price store selected by configuration
enum StoreHandle {
    Redis(RedisPriceStore),
    Memory(Arc<MemoryPriceStore>),
}

impl StoreHandle {
    fn shared(&self) -> Arc<dyn PriceStore> {
        match self {
            Self::Redis(store) => Arc::new(store.clone()),
            Self::Memory(store) => store.clone(),
        }
    }

    fn close(self) {
        match self {
            Self::Redis(store) => store.close(),
            Self::Memory(_) => {}
        }
    }
}

async fn open_store(config: &StoreConfig) -> Result<StoreHandle> {
    match config.backend.as_str() {
        "memory" => {
            let store = Arc::new(MemoryPriceStore::new());
            if let Some(seed_file) = &config.seed_file {
                let doc = SeedDocument::load(Path::new(seed_file))
                    .with_context(|| format!("Failed to load seed file {}", seed_file))?;
                apply_seed(store.as_ref(), &doc).await?;
            }
            info!("Using in-memory price store ({} keys)", store.len());
            Ok(StoreHandle::Memory(store))
        }
        _ => {
            let store = RedisPriceStore::connect(&config.redis_url)
                .await
                .with_context(|| format!("Failed to connect to Redis at {}", config.redis_url))?;
            Ok(StoreHandle::Redis(store))
        }
    }
}

/// Spot market selected by configuration
pub fn build_spot_market(config: &SpotConfig) -> Result<Arc<dyn SpotMarket>> {
    match (config.source.as_str(), &config.base_url) {
        ("http", Some(base_url)) => {
            info!("Using HTTP spot market at {} for {}", base_url, config.provider);
            let market = HttpSpotMarket::new(
                base_url.as_str(),
                config.provider.as_str(),
                Duration::from_secs(config.timeout_seconds),
            )?;
            Ok(Arc::new(market))
        }
        _ => {
            info!(
                "Using stub spot market for {} (spot prices fall back to on-demand)",
                config.provider
            );
            Ok(Arc::new(StubSpotMarket::new(config.provider.as_str())))
        }
    }
}

/// Start the cost engine server
///
/// This function:
/// 1. Initializes metrics
/// 2. Opens the price store and the spot market
/// 3. Sets up signal handlers for graceful shutdown
/// 4. Serves requests until SIGTERM/SIGINT, then closes the store
pub async fn start_server(config: Config) -> Result<()> {
    info!("Initializing Prometheus metrics...");
    let metrics_handle = Arc::new(metrics::init_metrics()?);

    let store = open_store(&config.store).await?;
    let market = build_spot_market(&config.spot)?;
    let state = AppState::new(store.shared(), market);

    let (shutdown_tx, signal_handle) = setup_signal_handlers();
    let mut shutdown_rx = shutdown_tx.subscribe();

    let app = create_router(state, metrics_handle);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    info!("Starting cost engine on {}", addr);
    info!(
        "Configuration: store backend {}, spot source {} ({})",
        config.store.backend, config.spot.source, config.spot.provider
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            info!("Shutdown signal received, draining connections...");
        })
        .await?;

    signal_handle.await?;
    store.close();
    info!("Server stopped gracefully");

    Ok(())
}

/// Create the Axum router with all routes and middleware
pub fn create_router(state: AppState, metrics_handle: Arc<PrometheusHandle>) -> Router {
    let api_routes = Router::new()
        .route("/analyze", post(handlers::analyze::analyze_job))
        .route("/api/v1/analyze", post(handlers::analyze::analyze_job))
        .route("/ready", get(handlers::health::readiness_check))
        .with_state(state);

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics_handler::metrics))
        .with_state(metrics_handle)
        .merge(api_routes)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(TraceLayer::new_for_http())
}
