//! HTTP API exposing the session store.
//!
//! The session token travels through the configured
//! [`TokenTransport`](crate::transport::TokenTransport) (a cookie by default).
//!
//! ## Endpoints
//!
//! ### Health & Info
//! - `GET /health` - Health check
//! - `GET /api/v1` - API information
//!
//! ### Caller's session
//! - `POST /api/v1/session` - Start a session and receive its token
//! - `GET /api/v1/session` - Session status (refreshes the idle timer)
//! - `DELETE /api/v1/session` - End the session and clear the token
//! - `GET|PUT|DELETE /api/v1/session/values/{key}` - Payload access
//!
//! ### Administration
//! - `GET /api/v1/sessions` - Session count and idle figures (no ids)
//!
//! ## Example
//!
//! ```no_run
//! use ttl_session::api::{serve, AppState, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> ttl_session::Result<()> {
//!     serve(ServerConfig::new("127.0.0.1", 3000), AppState::new()).await
//! }
//! ```

pub mod handlers;
pub mod router;
pub mod types;

pub use handlers::AppState;
pub use router::{create_router, create_router_with_state, serve, ServerConfig};
pub use types::{
    CreateSessionResponse, ErrorResponse, ListSessionsResponse, SessionStatusResponse,
    SessionSummary,
};
