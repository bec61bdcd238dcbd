//! Session management module.
//!
//! This module provides the session store, identifier issuance, payload
//! values, time sources, and the background expiry sweeper.

mod clock;
mod id;
mod store;
mod sweeper;
mod value;

pub use clock::{Clock, ManualClock, SystemClock};
pub use id::{EntropySource, OsEntropy, SessionId, ID_ENTROPY_BYTES, ID_LEN};
pub use store::{Session, SessionStore, StoreConfig};
pub use sweeper::Sweeper;
pub use value::SessionValue;
