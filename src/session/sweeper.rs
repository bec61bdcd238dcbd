//! Background expiry sweep.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use super::SessionStore;
use crate::error::SessionError;
use crate::Result;

/// Recurring task that evicts expired sessions from a store.
///
/// The task runs until [`Sweeper::stop`] is awaited. Dropping the handle
/// without stopping aborts the task.
#[derive(Debug)]
pub struct Sweeper {
    shutdown: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
    period: Duration,
}

impl Sweeper {
    /// Start sweeping at the store's configured interval.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(store: Arc<SessionStore>) -> Self {
        // Validated when the store was built
        let period = store.sweep_interval();
        Self::start(store, period)
    }

    /// Start sweeping at an explicit interval.
    ///
    /// Fails with [`SessionError::InvalidConfig`] for a zero interval.
    pub fn spawn_with_interval(store: Arc<SessionStore>, period: Duration) -> Result<Self> {
        if period.is_zero() {
            return Err(SessionError::InvalidConfig(
                "sweep interval must be greater than zero".into(),
            ));
        }
        Ok(Self::start(store, period))
    }

    fn start(store: Arc<SessionStore>, period: Duration) -> Self {
        let (shutdown, mut stop_rx) = watch::channel(false);

        info!(
            interval_secs = period.as_secs_f64(),
            "Starting session sweeper"
        );

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            // First tick completes immediately; nothing can have expired yet
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let evicted = store.sweep();
                        debug!(evicted, "Sweep cycle finished");
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            debug!("Session sweeper stopped");
        });

        Self {
            shutdown,
            handle: Some(handle),
            period,
        }
    }

    /// Interval between sweeps.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Whether the background task is still alive.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Signal the task to exit after the current cycle and wait for it.
    pub async fn stop(mut self) {
        let _ = self.shutdown.send(true);
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
        info!("Session sweeper shut down");
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
