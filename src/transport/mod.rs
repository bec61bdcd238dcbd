//! Token transport between the session store and HTTP requests.
//!
//! The store only deals in [`SessionId`]s. A [`TokenTransport`] knows how
//! a client presents that identifier on a request and how to hand it back
//! (or revoke it) on a response.

mod bearer;
mod cookie;

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

use crate::session::{SessionId, SessionStore};
use crate::Result;

pub use bearer::{BearerTransport, SESSION_TOKEN_HEADER};
pub use cookie::{CookieTransport, SameSite, DEFAULT_COOKIE_NAME};

/// Carries a session token on requests and responses.
pub trait TokenTransport: Send + Sync {
    /// Raw token presented by the current request, if any.
    fn extract(&self, headers: &HeaderMap) -> Option<String>;

    /// Response header that [`attach`](Self::attach) and
    /// [`clear`](Self::clear) values belong in.
    fn header_name(&self) -> HeaderName;

    /// Header value handing `id` to the client.
    fn attach(&self, id: &SessionId) -> Result<HeaderValue>;

    /// Header value telling the client to forget its token.
    fn clear(&self) -> Result<HeaderValue>;
}

/// Create a session and build the response header that delivers it.
pub fn start_session(
    store: &SessionStore,
    transport: &dyn TokenTransport,
) -> Result<(SessionId, HeaderValue)> {
    let id = store.create()?;
    match transport.attach(&id) {
        Ok(header) => Ok((id, header)),
        Err(e) => {
            store.delete(&id);
            Err(e)
        }
    }
}

/// Resolve the request's token to a live session and refresh it.
///
/// Malformed, stale and missing tokens all yield `None`; the store is
/// never asked to create anything here.
pub fn resume_session(
    store: &SessionStore,
    transport: &dyn TokenTransport,
    headers: &HeaderMap,
) -> Option<SessionId> {
    let raw = transport.extract(headers)?;
    let id: SessionId = match raw.parse() {
        Ok(id) => id,
        Err(_) => {
            debug!("Ignoring malformed session token");
            return None;
        }
    };

    store.touch(&id).then_some(id)
}

/// Destroy the session named by the request's token.
///
/// Returns the header value clearing the token, or `None` when the
/// request carried no token at all.
pub fn end_session(
    store: &SessionStore,
    transport: &dyn TokenTransport,
    headers: &HeaderMap,
) -> Result<Option<HeaderValue>> {
    let Some(raw) = transport.extract(headers) else {
        return Ok(None);
    };

    if let Ok(id) = raw.parse::<SessionId>() {
        store.delete(&id);
    }

    transport.clear().map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{AUTHORIZATION, COOKIE};

    fn cookie_headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_start_then_resume() {
        let store = SessionStore::default();
        let transport = CookieTransport::new("sid").unwrap();

        let (id, header) = start_session(&store, &transport).unwrap();
        assert!(header.to_str().unwrap().starts_with(&format!("sid={}", id)));

        let headers = cookie_headers(&format!("sid={}", id));
        assert_eq!(resume_session(&store, &transport, &headers), Some(id));
    }

    #[test]
    fn test_resume_unknown_does_not_create() {
        let store = SessionStore::default();
        let transport = CookieTransport::new("sid").unwrap();
        let unknown = SessionId::generate(&crate::session::OsEntropy).unwrap();

        let headers = cookie_headers(&format!("sid={}", unknown));
        assert_eq!(resume_session(&store, &transport, &headers), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_resume_malformed_token() {
        let store = SessionStore::default();
        let transport = CookieTransport::new("sid").unwrap();

        let headers = cookie_headers("sid=../../etc/passwd");
        assert_eq!(resume_session(&store, &transport, &headers), None);
    }

    #[test]
    fn test_resume_without_token() {
        let store = SessionStore::default();
        let transport = CookieTransport::new("sid").unwrap();
        assert_eq!(resume_session(&store, &transport, &HeaderMap::new()), None);
    }

    #[test]
    fn test_end_session_clears() {
        let store = SessionStore::default();
        let transport = CookieTransport::new("sid").unwrap();
        let (id, _) = start_session(&store, &transport).unwrap();

        let headers = cookie_headers(&format!("sid={}", id));
        let cleared = end_session(&store, &transport, &headers).unwrap().unwrap();

        assert!(cleared.to_str().unwrap().contains("Max-Age=0"));
        assert!(!store.contains(&id));
    }

    #[test]
    fn test_end_session_without_token_is_noop() {
        let store = SessionStore::default();
        let transport = CookieTransport::new("sid").unwrap();
        store.create().unwrap();

        let result = end_session(&store, &transport, &HeaderMap::new()).unwrap();
        assert!(result.is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_bearer_round_trip() {
        let store = SessionStore::default();
        let transport = BearerTransport::default();
        let (id, header) = start_session(&store, &transport).unwrap();
        assert_eq!(header.to_str().unwrap(), id.as_str());

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", id)).unwrap(),
        );
        assert_eq!(resume_session(&store, &transport, &headers), Some(id));
    }
}
