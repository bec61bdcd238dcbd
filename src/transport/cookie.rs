//! Cookie-based token transport.

use std::fmt;
use std::time::Duration;

use axum::http::{
    header::{COOKIE, SET_COOKIE},
    HeaderMap, HeaderName, HeaderValue,
};

use super::TokenTransport;
use crate::error::SessionError;
use crate::session::SessionId;
use crate::Result;

/// `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Strict => "Strict",
            Self::Lax => "Lax",
            Self::None => "None",
        })
    }
}

/// Cookie name used when none is configured.
pub const DEFAULT_COOKIE_NAME: &str = "session_id";

/// Carries the session id in a cookie.
#[derive(Debug, Clone)]
pub struct CookieTransport {
    name: String,
    path: String,
    max_age: Option<Duration>,
    http_only: bool,
    secure: bool,
    same_site: SameSite,
}

impl CookieTransport {
    /// Create a transport for the cookie called `name`.
    ///
    /// Defaults: `Path=/`, `HttpOnly`, `SameSite=Lax`, session cookie
    /// (no `Max-Age`), not `Secure`.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() || !name.bytes().all(is_token_byte) {
            return Err(SessionError::InvalidConfig(format!(
                "invalid cookie name: {:?}",
                name
            )));
        }

        Ok(Self {
            name,
            ..Self::default()
        })
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        if !path.starts_with('/') || path.bytes().any(|b| b == b';' || b.is_ascii_control()) {
            return Err(SessionError::InvalidConfig(format!(
                "invalid cookie path: {:?}",
                path
            )));
        }
        self.path = path;
        Ok(self)
    }

    /// Let the cookie outlive the browser session by `max_age`.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = same_site;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn render(
        &self,
        value: &str,
        max_age_secs: Option<u64>,
        expire: bool,
    ) -> Result<HeaderValue> {
        let mut cookie = format!("{}={}; Path={}", self.name, value, self.path);

        if let Some(secs) = max_age_secs {
            cookie.push_str(&format!("; Max-Age={}", secs));
        }
        if expire {
            cookie.push_str("; Expires=Thu, 01 Jan 1970 00:00:00 GMT");
        }
        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str(&format!("; SameSite={}", self.same_site));

        HeaderValue::from_str(&cookie).map_err(|e| SessionError::InvalidConfig(e.to_string()))
    }
}

impl Default for CookieTransport {
    fn default() -> Self {
        Self {
            name: DEFAULT_COOKIE_NAME.to_string(),
            path: "/".to_string(),
            max_age: None,
            http_only: true,
            secure: false,
            same_site: SameSite::default(),
        }
    }
}

impl TokenTransport for CookieTransport {
    fn extract(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.name)
            .map(|(_, value)| value.trim_matches('"').to_string())
            .filter(|value| !value.is_empty())
    }

    fn header_name(&self) -> HeaderName {
        SET_COOKIE
    }

    fn attach(&self, id: &SessionId) -> Result<HeaderValue> {
        self.render(id.as_str(), self.max_age.map(|d| d.as_secs()), false)
    }

    fn clear(&self) -> Result<HeaderValue> {
        self.render("", Some(0), true)
    }
}

// RFC 6265 cookie-name: RFC 2616 token characters
fn is_token_byte(b: u8) -> bool {
    b.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?={}".contains(&b)
}
