//! Error types for ttl-session.

use thiserror::Error;

/// Main error type for session store operations.
///
/// Lookup misses are not errors: store operations report them through
/// `bool`/`Option` returns. Only identifier issuance and configuration
/// can fail.
#[derive(Error, Debug)]
pub enum SessionError {
    /// A presented token is not a well-formed session identifier.
    #[error("invalid session id: {0:?}")]
    InvalidSessionId(String),

    /// The secure random source could not produce bytes.
    #[error("entropy source failure: {0}")]
    Entropy(String),

    /// Store constructed with unusable settings (e.g. zero TTL).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for session store operations.
pub type Result<T> = std::result::Result<T, SessionError>;
