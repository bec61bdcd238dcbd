//! `Authorization` header token transport.

use axum::http::{header::AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};

use super::TokenTransport;
use crate::error::SessionError;
use crate::session::SessionId;
use crate::Result;

/// Response header carrying a freshly issued token.
pub const SESSION_TOKEN_HEADER: &str = "x-session-token";

/// Reads `Authorization: Bearer <id>` and returns new ids in
/// `X-Session-Token`.
#[derive(Debug, Clone)]
pub struct BearerTransport {
    prefix: String,
}

impl BearerTransport {
    /// Create a transport with a custom scheme prefix (e.g. `"Session "`).
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for BearerTransport {
    fn default() -> Self {
        Self::with_prefix("Bearer ")
    }
}

impl TokenTransport for BearerTransport {
    fn extract(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix(self.prefix.as_str()))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    }

    fn header_name(&self) -> HeaderName {
        HeaderName::from_static(SESSION_TOKEN_HEADER)
    }

    fn attach(&self, id: &SessionId) -> Result<HeaderValue> {
        HeaderValue::from_str(id.as_str())
            .map_err(|e| SessionError::InvalidSessionId(e.to_string()))
    }

    fn clear(&self) -> Result<HeaderValue> {
        Ok(HeaderValue::from_static(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth(value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        map
    }

    #[test]
    fn test_extract_bearer() {
        let transport = BearerTransport::default();
        assert_eq!(transport.extract(&auth("Bearer abc")), Some("abc".to_string()));
    }

    #[test]
    fn test_extract_wrong_scheme() {
        let transport = BearerTransport::default();
        assert_eq!(transport.extract(&auth("Basic credentials")), None);
        assert_eq!(transport.extract(&auth("Bearer ")), None);
        assert_eq!(transport.extract(&HeaderMap::new()), None);
    }

    #[test]
    fn test_custom_prefix() {
        let transport = BearerTransport::with_prefix("Session ");
        assert_eq!(transport.prefix(), "Session ");
        assert_eq!(transport.extract(&auth("Session xyz")), Some("xyz".to_string()));
        assert_eq!(transport.extract(&auth("Bearer xyz")), None);
    }

    #[test]
    fn test_header_name() {
        let transport = BearerTransport::default();
        assert_eq!(transport.header_name().as_str(), SESSION_TOKEN_HEADER);
        assert_eq!(transport.clear().unwrap(), "");
    }
}
