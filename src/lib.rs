//! # ttl-session
//!
//! In-process session store with idle expiry.
//!
//! A [`SessionStore`] maps opaque, unguessable identifiers to a bag of
//! key/value data. Sessions that go untouched for longer than the
//! configured TTL are evicted by a recurring [`Sweeper`] task.
//!
//! ## Features
//!
//! - **Secure identifiers**: 256 bits from the OS CSPRNG, URL-safe encoded
//! - **Explicit refresh**: only [`SessionStore::touch`] extends a session's life
//! - **Background sweep**: tokio task with an explicit stop signal
//! - **Token transport**: cookie or bearer-header glue for HTTP layers
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use ttl_session::{SessionStore, StoreConfig, Sweeper};
//!
//! #[tokio::main]
//! async fn main() -> ttl_session::Result<()> {
//!     ttl_session::logging::try_init().ok();
//!
//!     let store = Arc::new(SessionStore::new(StoreConfig::from_secs(1800))?);
//!     let sweeper = Sweeper::spawn(Arc::clone(&store));
//!
//!     let id = store.create()?;
//!     store.set(&id, "user", "alice");
//!
//!     if store.touch(&id) {
//!         println!("user = {:?}", store.get(&id, "user"));
//!     }
//!
//!     sweeper.stop().await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;
pub mod transport;

// Re-export commonly used types
pub use error::{Result, SessionError};
pub use session::{
    Clock, EntropySource, ManualClock, OsEntropy, Session, SessionId, SessionStore, SessionValue,
    StoreConfig, Sweeper, SystemClock,
};
pub use transport::{BearerTransport, CookieTransport, TokenTransport};
