//! API request and response types.

use std::time::Instant;

use serde::Serialize;

use crate::session::{Session, SessionId};

/// Response for session creation.
#[derive(Debug, Clone, Serialize)]
pub struct CreateSessionResponse {
    /// The assigned session ID.
    pub session_id: SessionId,
    /// Idle lifetime in seconds.
    pub ttl_seconds: u64,
}

/// Response for session status query.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatusResponse {
    /// Session ID.
    pub session_id: SessionId,
    /// Seconds since creation.
    pub age_seconds: f64,
    /// Seconds since last touch.
    pub idle_seconds: f64,
    /// Keys currently stored, sorted.
    pub keys: Vec<String>,
}

impl SessionStatusResponse {
    pub fn from_session(session: &Session, now: Instant) -> Self {
        let mut keys: Vec<String> = session.values.keys().cloned().collect();
        keys.sort();

        Self {
            session_id: session.id.clone(),
            age_seconds: now.saturating_duration_since(session.created_at).as_secs_f64(),
            idle_seconds: session.idle_duration(now).as_secs_f64(),
            keys,
        }
    }
}

/// Summary entry in the session list.
///
/// Carries no identifier: the id is the client's credential.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub age_seconds: f64,
    pub idle_seconds: f64,
    pub value_count: usize,
}

impl SessionSummary {
    pub fn from_session(session: &Session, now: Instant) -> Self {
        Self {
            age_seconds: now.saturating_duration_since(session.created_at).as_secs_f64(),
            idle_seconds: session.idle_duration(now).as_secs_f64(),
            value_count: session.values.len(),
        }
    }
}

/// Response for listing sessions.
#[derive(Debug, Clone, Serialize)]
pub struct ListSessionsResponse {
    pub count: usize,
    pub sessions: Vec<SessionSummary>,
}

/// Generic API error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "SESSION_NOT_FOUND").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn session_not_found() -> Self {
        Self::new(
            "SESSION_NOT_FOUND",
            "No live session for the presented token",
        )
    }

    pub fn key_not_found(key: &str) -> Self {
        Self::new("KEY_NOT_FOUND", format!("Key '{}' not found in session", key))
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SessionStore, SessionValue};

    #[test]
    fn test_error_response_serialization() {
        let err = ErrorResponse::key_not_found("cart");
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["code"], "KEY_NOT_FOUND");
        assert!(json["message"].as_str().unwrap().contains("cart"));
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_error_response_with_details() {
        let err = ErrorResponse::internal_error("boom").with_details("entropy");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["details"], "entropy");
    }

    #[test]
    fn test_summary_omits_id() {
        let store = SessionStore::default();
        let id = store.create().unwrap();
        store.set(&id, "k", 1i64);

        let session = store.snapshot(&id).unwrap();
        let summary = SessionSummary::from_session(&session, store.now());
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["value_count"], 1);
        assert!(json.get("session_id").is_none());
        assert!(!json.to_string().contains(id.as_str()));
    }

    #[test]
    fn test_status_from_session() {
        let store = SessionStore::default();
        let id = store.create().unwrap();
        store.set(&id, "b", SessionValue::Null);
        store.set(&id, "a", SessionValue::Null);

        let session = store.snapshot(&id).unwrap();
        let status = SessionStatusResponse::from_session(&session, store.now());

        assert_eq!(status.session_id, id);
        assert_eq!(status.keys, vec!["a".to_string(), "b".to_string()]);
        assert!(status.idle_seconds >= 0.0);
    }
}
