//! Session storage and management.
//!
//! All operations run as short critical sections over one table-wide
//! `RwLock`. Pure reads share the read side; anything that mutates the
//! table or a session (including [`SessionStore::touch`] and
//! [`SessionStore::sweep`]) takes the write side, so a sweep always sees a
//! consistent cut with respect to concurrent create/delete/set/touch.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, trace, warn};

use super::clock::{Clock, SystemClock};
use super::id::{EntropySource, OsEntropy, SessionId};
use super::value::SessionValue;
use crate::error::SessionError;
use crate::Result;

/// Store settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Idle lifetime; a session untouched for longer than this is evicted.
    pub ttl: Duration,
    /// Period of the background sweep. Defaults to `ttl` when unset.
    pub sweep_interval: Option<Duration>,
}

impl StoreConfig {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sweep_interval: None,
        }
    }

    pub fn from_secs(ttl_secs: u64) -> Self {
        Self::new(Duration::from_secs(ttl_secs))
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = Some(interval);
        self
    }

    /// The period the sweeper actually runs at.
    pub fn effective_sweep_interval(&self) -> Duration {
        self.sweep_interval.unwrap_or(self.ttl)
    }

    /// Reject settings the store cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.ttl.is_zero() {
            return Err(SessionError::InvalidConfig(
                "ttl must be greater than zero".into(),
            ));
        }
        if self.sweep_interval.is_some_and(|i| i.is_zero()) {
            return Err(SessionError::InvalidConfig(
                "sweep interval must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::from_secs(30 * 60)
    }
}

/// Server-side state for one client.
///
/// Values handed out by the store are clones; mutating one has no effect
/// on the stored session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Unique identifier.
    pub id: SessionId,
    /// Time when session was created.
    pub created_at: Instant,
    /// Time of last touch.
    pub last_accessed: Instant,
    /// Opaque payload.
    pub values: HashMap<String, SessionValue>,
}

impl Session {
    fn new(id: SessionId, now: Instant) -> Self {
        Self {
            id,
            created_at: now,
            last_accessed: now,
            values: HashMap::new(),
        }
    }

    /// Move last access forward to `now`. Never moves it backwards.
    fn touch(&mut self, now: Instant) {
        if now > self.last_accessed {
            self.last_accessed = now;
        }
    }

    /// Idle duration as observed at `now`.
    pub fn idle_duration(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_accessed)
    }

    /// Whether the session has been idle for strictly longer than `ttl`.
    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        self.idle_duration(now) > ttl
    }
}

/// Thread-safe storage for sessions.
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, Session>>,
    config: StoreConfig,
    clock: Arc<dyn Clock>,
    entropy: Arc<dyn EntropySource>,
}

impl SessionStore {
    /// Create a new empty session store using the system clock and OS entropy.
    pub fn new(config: StoreConfig) -> Result<Self> {
        Self::with_sources(config, Arc::new(SystemClock), Arc::new(OsEntropy))
    }

    /// Create a store with a custom clock.
    pub fn with_clock(config: StoreConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        Self::with_sources(config, clock, Arc::new(OsEntropy))
    }

    /// Create a store with custom clock and entropy source.
    pub fn with_sources(
        config: StoreConfig,
        clock: Arc<dyn Clock>,
        entropy: Arc<dyn EntropySource>,
    ) -> Result<Self> {
        config.validate()?;

        debug!(
            ttl_secs = config.ttl.as_secs_f64(),
            sweep_interval_secs = config.effective_sweep_interval().as_secs_f64(),
            "Session store created"
        );

        Ok(Self {
            sessions: RwLock::new(HashMap::new()),
            config,
            clock,
            entropy,
        })
    }

    // The table holds plain data and every critical section leaves it
    // consistent, so a poisoned lock is recovered rather than propagated.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<SessionId, Session>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<SessionId, Session>> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn generate_id(&self) -> Result<SessionId> {
        SessionId::generate(self.entropy.as_ref()).map_err(|e| {
            error!(error = %e, "Failed to generate session id");
            e
        })
    }

    /// Get the store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Configured idle lifetime.
    pub fn ttl(&self) -> Duration {
        self.config.ttl
    }

    /// Period the background sweeper should run at.
    pub fn sweep_interval(&self) -> Duration {
        self.config.effective_sweep_interval()
    }

    /// Current time according to the store's clock.
    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Create a new, empty session.
    ///
    /// Returns the newly assigned session ID. Fails only if the entropy
    /// source fails, in which case nothing is inserted.
    pub fn create(&self) -> Result<SessionId> {
        let mut id = self.generate_id()?;

        let mut sessions = self.write();
        while sessions.contains_key(&id) {
            warn!("Session id collision, regenerating");
            id = self.generate_id()?;
        }

        let now = self.clock.now();
        sessions.insert(id.clone(), Session::new(id.clone(), now));
        trace!(session_id = %id, total = sessions.len(), "Session created");

        Ok(id)
    }

    /// Mark a session as actively used.
    ///
    /// Returns `false` (and does nothing) if the session does not exist.
    pub fn touch(&self, id: &SessionId) -> bool {
        let mut sessions = self.write();
        match sessions.get_mut(id) {
            Some(session) => {
                session.touch(self.clock.now());
                true
            }
            None => false,
        }
    }

    /// Remove a session. Removing an absent session is a no-op.
    pub fn delete(&self, id: &SessionId) {
        self.remove(id);
    }

    /// Remove a session, reporting whether it existed.
    pub fn remove(&self, id: &SessionId) -> bool {
        let removed = self.write().remove(id).is_some();
        if removed {
            trace!(session_id = %id, "Session removed");
        }
        removed
    }

    /// Store `value` under `key`, overwriting any previous value.
    ///
    /// Returns `false` without creating anything if the session does not exist.
    pub fn set(
        &self,
        id: &SessionId,
        key: impl Into<String>,
        value: impl Into<SessionValue>,
    ) -> bool {
        let mut sessions = self.write();
        match sessions.get_mut(id) {
            Some(session) => {
                session.values.insert(key.into(), value.into());
                true
            }
            None => false,
        }
    }

    /// Remove a single key from a session.
    ///
    /// Returns `true` only if both the session and the key existed.
    pub fn unset(&self, id: &SessionId, key: &str) -> bool {
        self.write()
            .get_mut(id)
            .is_some_and(|session| session.values.remove(key).is_some())
    }

    /// Read a value. Does not refresh last access.
    pub fn get(&self, id: &SessionId, key: &str) -> Option<SessionValue> {
        self.read()
            .get(id)
            .and_then(|session| session.values.get(key).cloned())
    }

    /// Last access time of a session. Does not refresh it.
    pub fn last_accessed(&self, id: &SessionId) -> Option<Instant> {
        self.read().get(id).map(|session| session.last_accessed)
    }

    /// Time since last access. Does not refresh it.
    pub fn idle_time(&self, id: &SessionId) -> Option<Duration> {
        let now = self.clock.now();
        self.read().get(id).map(|session| session.idle_duration(now))
    }

    /// Get a clone of the session with the given ID. Does not refresh it.
    pub fn snapshot(&self, id: &SessionId) -> Option<Session> {
        self.read().get(id).cloned()
    }

    /// Check if a session exists. Does not refresh it.
    pub fn contains(&self, id: &SessionId) -> bool {
        self.read().contains_key(id)
    }

    /// Get the number of sessions in the store.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Snapshot of all live session IDs, in no particular order.
    pub fn list_ids(&self) -> Vec<SessionId> {
        self.read().keys().cloned().collect()
    }

    /// Drop every session.
    pub fn clear(&self) -> usize {
        let mut sessions = self.write();
        let count = sessions.len();
        sessions.clear();
        count
    }

    /// Evict every session idle for longer than the TTL.
    ///
    /// Returns the number of sessions removed.
    pub fn sweep(&self) -> usize {
        let mut sessions = self.write();
        let now = self.clock.now();
        let ttl = self.config.ttl;

        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now, ttl));
        let evicted = before - sessions.len();

        if evicted > 0 {
            info!(evicted, remaining = sessions.len(), "Expired sessions swept");
        } else {
            trace!(remaining = sessions.len(), "Sweep found nothing to evict");
        }

        evicted
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            config: StoreConfig::default(),
            clock: Arc::new(SystemClock),
            entropy: Arc::new(OsEntropy),
        }
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("sessions", &self.len())
            .field("config", &self.config)
            .finish()
    }
}
