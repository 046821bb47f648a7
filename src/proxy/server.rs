//! Gateway server: shared state, router construction, and lifecycle

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handler::{self, MAX_BODY_BYTES};
use crate::client::BackendClient;
use crate::config::GatewayConfig;
use crate::registry::BackendRegistry;

/// Shared state for all handlers. The client is the only shared mutable
/// resource (its connection pool); it is safe for concurrent use by
/// construction.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<GatewayConfig>,
    pub registry: Arc<BackendRegistry>,
    pub client: BackendClient,
}

impl GatewayState {
    pub fn new(config: GatewayConfig) -> Result<Self, reqwest::Error> {
        let client = BackendClient::new(config.request_timeout())?;
        let registry = BackendRegistry::from_endpoints(&config.backends);

        Ok(Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
            client,
        })
    }
}

/// Build the gateway router over the given state
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(handler::health))
        .route("/v1/models", get(handler::models))
        .route("/v1/chat/completions", post(handler::chat_completions))
        .route("/v1/embeddings", post(handler::embeddings))
        .route("/v1/audio/transcriptions", post(handler::transcriptions))
        .route("/v1/audio/speech", post(handler::speech))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the gateway server until shutdown
pub async fn run_server(config: GatewayConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = GatewayState::new(config)?;

    for backend in state.registry.all() {
        tracing::info!(backend = backend.name, url = %backend.base_url, "Registered backend");
    }

    let addr: SocketAddr = format!(
        "{}:{}",
        state.config.server.host, state.config.server.port
    )
    .parse()?;

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("inference-gateway listening on {}", addr);

    Ok(axum::serve(listener, app).await?)
}
