//! API router configuration.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    api_info, create_session, delete_session, delete_value, get_session, get_value, health,
    list_sessions, put_value, AppState,
};

/// Create the API router with a default store and cookie transport.
pub fn create_router() -> Router {
    create_router_with_state(AppState::new())
}

/// Create the API router with custom state.
pub fn create_router_with_state(state: AppState) -> Router {
    // Routes acting on the caller's own session
    let session_routes = Router::new()
        .route(
            "/",
            get(get_session).post(create_session).delete(delete_session),
        )
        .route(
            "/values/{key}",
            get(get_value).put(put_value).delete(delete_value),
        );

    // API v1 routes
    let api_v1 = Router::new()
        .route("/", get(api_info))
        .route("/sessions", get(list_sessions))
        .nest("/session", session_routes);

    // Build main router
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_v1)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Finish in-flight requests on Ctrl-C instead of exiting immediately.
    pub graceful_shutdown: bool,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            graceful_shutdown: true,
        }
    }

    pub fn without_graceful_shutdown(mut self) -> Self {
        self.graceful_shutdown = false;
        self
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new("127.0.0.1", 3000)
    }
}

/// Start the API server with the given state.
///
/// Returns once the server stops; with graceful shutdown enabled that is
/// after Ctrl-C and in-flight requests have drained.
pub async fn serve(config: ServerConfig, state: AppState) -> crate::Result<()> {
    let addr = config.bind_address();
    let router = create_router_with_state(state);

    tracing::info!("Starting ttl-session API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(crate::error::SessionError::Io)?;

    let server = axum::serve(listener, router);
    let result = if config.graceful_shutdown {
        server.with_graceful_shutdown(shutdown_signal()).await
    } else {
        server.await
    };

    result.map_err(crate::error::SessionError::Io)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
