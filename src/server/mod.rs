//! HTTP Server
//!
//! Router construction and the serve loop. The provider adapter and settings
//! are constructed once at startup and injected into handlers through
//! [`AppState`]; there is no lazily-initialized global.

mod handlers;

pub use handlers::ApiError;

use axum::Router;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::ai::{SharedProvider, create_provider};
use crate::config::Settings;
use crate::types::{ExplainError, Result};

/// Shared application context, cloned per request.
///
/// Read-only after construction: settings are validated before the server
/// starts and the provider holds only its credential and HTTP client.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub provider: SharedProvider,
}

impl AppState {
    pub fn new(settings: Arc<Settings>, provider: SharedProvider) -> Self {
        Self { settings, provider }
    }
}

/// Build the application router with all routes and middleware.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.settings);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/explain-topic", post(handlers::explain_topic))
        .route("/batch-explain", post(handlers::batch_explain))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(settings: &Settings) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    if settings.allows_any_origin() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = settings
        .origins()
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
}

/// Construct the provider from settings and serve until shutdown.
pub async fn run(settings: Settings) -> Result<()> {
    let provider = create_provider(&settings)?;
    info!("Using {} provider (model: {})", provider.name(), settings.model);

    let host: IpAddr = settings
        .host
        .parse()
        .map_err(|e| ExplainError::Config(format!("invalid host '{}': {}", settings.host, e)))?;
    let addr = SocketAddr::new(host, settings.port);

    let state = AppState::new(Arc::new(settings), provider);
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    info!("Topic explanation service listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install CTRL+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => warn!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
