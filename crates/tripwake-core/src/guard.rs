//! Wake-lock ownership.
//!
//! [`ResourceGuard`] holds at most one wake lock at a time:
//! - `acquire` releases any held lock before requesting a new one
//! - `release` is idempotent and always clears the local handle
//! - dropping the guard releases whatever it still holds
//!
//! Every request carries the fixed [`WAKE_LOCK_TIMEOUT`] ceiling.

use tracing::{debug, info, warn};

use crate::config::WAKE_LOCK_TIMEOUT;
use crate::platform::{PowerManager, WakeLockHandle, WakeLockRequest};

/// Local view of the wake lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// No lock is held.
    NoLock,
    /// Exactly one lock is held.
    Held,
}

/// Outcome of [`ResourceGuard::acquire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// The OS granted a fresh lock.
    Acquired,
    /// The OS refused; tracking continues without CPU keep-awake.
    Degraded,
}

/// Sole owner of the OS wake lock.
pub struct ResourceGuard<P: PowerManager> {
    power: P,
    tag: String,
    held: Option<WakeLockHandle>,
}

impl<P: PowerManager> ResourceGuard<P> {
    /// Create a guard that requests locks tagged `tag`.
    pub fn new(power: P, tag: impl Into<String>) -> Self {
        Self {
            power,
            tag: tag.into(),
            held: None,
        }
    }

    /// Release any held lock, then request a new one.
    ///
    /// Reacquiring restarts the timeout ceiling. A refusal from the OS is
    /// logged and reported as [`AcquireOutcome::Degraded`], never as an error.
    pub fn acquire(&mut self) -> AcquireOutcome {
        self.release();

        let request = WakeLockRequest::partial(self.tag.clone(), WAKE_LOCK_TIMEOUT);
        match self.power.acquire(&request) {
            Ok(handle) => {
                info!(
                    tag = %handle.tag(),
                    token = %handle.token(),
                    expires_at = %handle.expires_at(),
                    "Wake lock acquired"
                );
                self.held = Some(handle);
                AcquireOutcome::Acquired
            }
            Err(e) => {
                warn!(tag = %self.tag, error = %e, "Wake lock denied, continuing without it");
                AcquireOutcome::Degraded
            }
        }
    }

    /// Release the held lock, if any.
    ///
    /// The OS is only asked to release a lock it still reports as held (it
    /// may already have dropped it at the ceiling). The local handle is
    /// cleared in every case.
    pub fn release(&mut self) {
        let Some(handle) = self.held.take() else {
            debug!("Release requested with no wake lock held");
            return;
        };

        let token = handle.token();
        match self.power.is_held(&handle) {
            Ok(true) => match self.power.release(handle) {
                Ok(()) => info!(%token, "Wake lock released"),
                Err(e) => warn!(%token, error = %e, "Wake lock release failed"),
            },
            Ok(false) => debug!(%token, "Wake lock already dropped by the OS"),
            Err(e) => warn!(%token, error = %e, "Could not query wake lock state"),
        }
    }

    /// Current local lock state.
    #[must_use]
    pub const fn state(&self) -> LockState {
        if self.held.is_some() {
            LockState::Held
        } else {
            LockState::NoLock
        }
    }

    /// The held handle, if any.
    #[must_use]
    pub const fn handle(&self) -> Option<&WakeLockHandle> {
        self.held.as_ref()
    }
}

impl<P: PowerManager> Drop for ResourceGuard<P> {
    fn drop(&mut self) {
        self.release();
    }
}
