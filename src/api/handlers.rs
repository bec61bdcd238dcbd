//! REST API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use super::types::{
    CreateSessionResponse, ErrorResponse, ListSessionsResponse, SessionStatusResponse,
    SessionSummary,
};
use crate::session::{SessionId, SessionStore, SessionValue};
use crate::transport::{
    end_session, resume_session, start_session, CookieTransport, TokenTransport,
};

/// Error half of every handler result.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Successful session creation: status, token header, body.
pub type Created = (
    StatusCode,
    [(HeaderName, HeaderValue); 1],
    Json<CreateSessionResponse>,
);

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SessionStore>,
    pub transport: Arc<dyn TokenTransport>,
}

impl AppState {
    /// Default store with cookie transport.
    pub fn new() -> Self {
        Self::with_store(
            Arc::new(SessionStore::default()),
            Arc::new(CookieTransport::default()),
        )
    }

    pub fn with_store(store: Arc<SessionStore>, transport: Arc<dyn TokenTransport>) -> Self {
        Self { store, transport }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

fn internal(e: impl ToString) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::internal_error(e.to_string())),
    )
}

fn not_found(body: ErrorResponse) -> ApiError {
    (StatusCode::NOT_FOUND, Json(body))
}

fn unauthorized() -> ApiError {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::session_not_found()),
    )
}

/// Resolve and refresh the caller's session, or reject with 401.
fn require_session(state: &AppState, headers: &HeaderMap) -> Result<SessionId, ApiError> {
    resume_session(&state.store, state.transport.as_ref(), headers).ok_or_else(unauthorized)
}

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}

/// API information endpoint.
pub async fn api_info() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "ttl-session",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

/// Issue a new session and hand its token to the client.
pub async fn create_session(State(state): State<AppState>) -> Result<Created, ApiError> {
    let (session_id, token) =
        start_session(&state.store, state.transport.as_ref()).map_err(internal)?;

    Ok((
        StatusCode::CREATED,
        [(state.transport.header_name(), token)],
        Json(CreateSessionResponse {
            session_id,
            ttl_seconds: state.store.ttl().as_secs(),
        }),
    ))
}

/// Status of the caller's session. Counts as activity.
pub async fn get_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionStatusResponse>, ApiError> {
    let id = require_session(&state, &headers)?;

    let session = state.store.snapshot(&id).ok_or_else(unauthorized)?;

    Ok(Json(SessionStatusResponse::from_session(
        &session,
        state.store.now(),
    )))
}

/// Destroy the caller's session and clear its token.
pub async fn delete_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let cleared =
        end_session(&state.store, state.transport.as_ref(), &headers).map_err(internal)?;

    Ok(match cleared {
        Some(value) => (
            StatusCode::NO_CONTENT,
            [(state.transport.header_name(), value)],
        )
            .into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

/// Read one value from the caller's session.
pub async fn get_value(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(key): Path<String>,
) -> Result<Json<SessionValue>, ApiError> {
    let id = require_session(&state, &headers)?;

    state
        .store
        .get(&id, &key)
        .map(Json)
        .ok_or_else(|| not_found(ErrorResponse::key_not_found(&key)))
}

/// Store one value in the caller's session.
pub async fn put_value(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(key): Path<String>,
    Json(value): Json<SessionValue>,
) -> Result<StatusCode, ApiError> {
    let id = require_session(&state, &headers)?;

    if key.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("key must not be empty")),
        ));
    }

    store_value(&state.store, &id, key, value)
}

// The session can be swept between resume and set
fn store_value(
    store: &SessionStore,
    id: &SessionId,
    key: String,
    value: SessionValue,
) -> Result<StatusCode, ApiError> {
    if store.set(id, key, value) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(unauthorized())
    }
}

/// Remove one value from the caller's session.
pub async fn delete_value(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = require_session(&state, &headers)?;

    if state.store.unset(&id, &key) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(ErrorResponse::key_not_found(&key)))
    }
}

/// Count and idle figures for all live sessions. Never exposes ids.
pub async fn list_sessions(State(state): State<AppState>) -> Json<ListSessionsResponse> {
    let now = state.store.now();
    let ids = state.store.list_ids();

    let mut sessions = Vec::with_capacity(ids.len());
    for id in ids {
        // Skip sessions removed since the id snapshot
        if let Some(session) = state.store.snapshot(&id) {
            sessions.push(SessionSummary::from_session(&session, now));
        }
    }

    Json(ListSessionsResponse {
        count: sessions.len(),
        sessions,
    })
}
