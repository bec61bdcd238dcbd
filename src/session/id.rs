//! Session identifier type.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::rngs::OsRng;
use rand::TryRngCore;
use serde::Serialize;

use crate::error::SessionError;
use crate::Result;

/// Number of random bytes behind every identifier (256 bits).
pub const ID_ENTROPY_BYTES: usize = 32;

/// Length of the encoded identifier: unpadded base64 of 32 bytes.
pub const ID_LEN: usize = 43;

/// Source of cryptographically secure random bytes.
///
/// Implementations must report failure instead of handing back a partially
/// filled or zeroed buffer.
pub trait EntropySource: Send + Sync {
    /// Fill `buf` entirely with random bytes.
    fn fill(&self, buf: &mut [u8]) -> Result<()>;
}

/// Operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, buf: &mut [u8]) -> Result<()> {
        OsRng
            .try_fill_bytes(buf)
            .map_err(|e| SessionError::Entropy(e.to_string()))
    }
}

/// Opaque, URL-safe, unguessable session identifier.
///
/// Rendered as unpadded URL-safe base64 (`A-Z a-z 0-9 - _`), so it can
/// travel in cookies, headers and URLs without escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Draw a fresh identifier from the given entropy source.
    pub fn generate(source: &dyn EntropySource) -> Result<Self> {
        let mut bytes = [0u8; ID_ENTROPY_BYTES];
        source.fill(&mut bytes)?;
        Ok(Self(URL_SAFE_NO_PAD.encode(bytes)))
    }

    /// Borrow the encoded identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the identifier, returning the encoded string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for SessionId {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self> {
        if s.len() != ID_LEN {
            return Err(SessionError::InvalidSessionId(s.into()));
        }

        // Decoding also rejects non-canonical trailing bits
        match URL_SAFE_NO_PAD.decode(s) {
            Ok(bytes) if bytes.len() == ID_ENTROPY_BYTES => Ok(Self(s.to_string())),
            _ => Err(SessionError::InvalidSessionId(s.into())),
        }
    }
}
