//! Command dispatch for the application layer.
//!
//! [`ServiceBridge`] is the single entry point into the core. It turns each
//! [`Command`] into a resource-guard or presenter action and answers with a
//! [`Reply`]. Recognized commands are always acknowledged: OS refusals are
//! logged and the session carries on in degraded mode.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::Result;
use crate::guard::{AcquireOutcome, LockState, ResourceGuard};
use crate::platform::{NotificationManager, PowerManager};
use crate::presenter::NotificationPresenter;

/// Method name of [`Command::AcquireWakeLock`].
pub const METHOD_ACQUIRE_WAKE_LOCK: &str = "acquireWakeLock";
/// Method name of [`Command::ReleaseWakeLock`].
pub const METHOD_RELEASE_WAKE_LOCK: &str = "releaseWakeLock";
/// Method name of [`Command::UpdateNotification`].
pub const METHOD_UPDATE_NOTIFICATION: &str = "updateNotification";

/// A command from the application layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Hold the CPU awake (renews the ceiling if already held).
    AcquireWakeLock,
    /// Let the CPU sleep again.
    ReleaseWakeLock,
    /// Replace the body of the ongoing notification; `None` means the
    /// default text.
    UpdateNotification {
        /// Body text.
        text: Option<String>,
    },
    /// Anything else.
    Unrecognized {
        /// The method name as received.
        method: String,
    },
}

impl Command {
    /// Map a method name to a command. `text` is only used by
    /// `updateNotification`.
    #[must_use]
    pub fn from_method(method: &str, text: Option<String>) -> Self {
        match method {
            METHOD_ACQUIRE_WAKE_LOCK => Self::AcquireWakeLock,
            METHOD_RELEASE_WAKE_LOCK => Self::ReleaseWakeLock,
            METHOD_UPDATE_NOTIFICATION => Self::UpdateNotification { text },
            other => Self::Unrecognized {
                method: other.to_string(),
            },
        }
    }

    /// The method name this command travels under.
    #[must_use]
    pub fn method(&self) -> &str {
        match self {
            Self::AcquireWakeLock => METHOD_ACQUIRE_WAKE_LOCK,
            Self::ReleaseWakeLock => METHOD_RELEASE_WAKE_LOCK,
            Self::UpdateNotification { .. } => METHOD_UPDATE_NOTIFICATION,
            Self::Unrecognized { method } => method,
        }
    }
}

/// Answer to a [`Command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// The command was accepted.
    Ack,
    /// The command is not part of the protocol.
    NotImplemented,
}

/// Whether a tracking session is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No wake lock held.
    Idle,
    /// A wake lock is held.
    Active,
}

/// Details of the held wake lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WakeLockInfo {
    /// Grant token.
    pub token: Uuid,
    /// Lock tag.
    pub tag: String,
    /// When the lock was granted.
    pub acquired_at: DateTime<Utc>,
    /// When the OS drops it unless renewed.
    pub expires_at: DateTime<Utc>,
}

/// Snapshot of the tracking session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackingSession {
    /// Session state.
    pub state: SessionState,
    /// The held lock, present only when [`SessionState::Active`].
    pub wake_lock: Option<WakeLockInfo>,
    /// Body of the last notification the OS accepted.
    pub last_notification: Option<String>,
}

/// Dispatcher between the application layer and the OS resources.
pub struct ServiceBridge<P: PowerManager, N: NotificationManager> {
    guard: ResourceGuard<P>,
    presenter: NotificationPresenter<N>,
}

impl<P: PowerManager, N: NotificationManager> ServiceBridge<P, N> {
    /// Build the bridge from validated configuration.
    ///
    /// Registers the notification channel as part of construction.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn new(power: P, notifications: N, config: &Config) -> Result<Self> {
        config.validate()?;

        let guard = ResourceGuard::new(power, config.wake_lock.tag.clone());
        let presenter = NotificationPresenter::new(notifications, &config.notification);
        info!(tag = %config.wake_lock.tag, "Service bridge ready");

        Ok(Self { guard, presenter })
    }

    /// Handle one command to completion.
    pub fn handle(&mut self, command: Command) -> Reply {
        debug!(method = command.method(), "Handling command");

        match command {
            Command::AcquireWakeLock => {
                if self.guard.acquire() == AcquireOutcome::Degraded {
                    warn!("Tracking without wake lock");
                }
                Reply::Ack
            }
            Command::ReleaseWakeLock => {
                self.guard.release();
                Reply::Ack
            }
            Command::UpdateNotification { text } => {
                let text = text.unwrap_or_else(|| self.presenter.default_text().to_string());
                if let Err(e) = self.presenter.update(&text) {
                    warn!(error = %e, "Tracking notification not shown");
                }
                Reply::Ack
            }
            Command::Unrecognized { method } => {
                warn!(%method, "Unrecognized command");
                Reply::NotImplemented
            }
        }
    }

    /// Current session snapshot.
    #[must_use]
    pub fn session(&self) -> TrackingSession {
        let wake_lock = self.guard.handle().map(|handle| WakeLockInfo {
            token: handle.token(),
            tag: handle.tag().to_string(),
            acquired_at: handle.acquired_at(),
            expires_at: handle.expires_at(),
        });
        let state = match self.guard.state() {
            LockState::Held => SessionState::Active,
            LockState::NoLock => SessionState::Idle,
        };

        TrackingSession {
            state,
            wake_lock,
            last_notification: self.presenter.last_text().map(ToString::to_string),
        }
    }

    /// Local wake-lock state.
    #[must_use]
    pub const fn lock_state(&self) -> LockState {
        self.guard.state()
    }

    /// Tear the session down, releasing any held wake lock.
    ///
    /// Dropping the bridge does the same.
    pub fn shutdown(&mut self) {
        info!("Service bridge shutting down");
        self.guard.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockPlatform;

    fn bridge(platform: &MockPlatform) -> ServiceBridge<MockPlatform, MockPlatform> {
        ServiceBridge::new(platform.clone(), platform.clone(), &Config::default()).unwrap()
    }

    #[test]
    fn test_command_from_method() {
        assert_eq!(
            Command::from_method("acquireWakeLock", None),
            Command::AcquireWakeLock
        );
        assert_eq!(
            Command::from_method("releaseWakeLock", Some("ignored".into())),
            Command::ReleaseWakeLock
        );
        assert_eq!(
            Command::from_method("updateNotification", Some("hi".into())),
            Command::UpdateNotification {
                text: Some("hi".into())
            }
        );
        assert_eq!(
            Command::from_method("AcquireWakeLock", None),
            Command::Unrecognized {
                method: "AcquireWakeLock".into()
            }
        );
    }

    #[test]
    fn test_method_names_round_trip() {
        for method in [
            METHOD_ACQUIRE_WAKE_LOCK,
            METHOD_RELEASE_WAKE_LOCK,
            METHOD_UPDATE_NOTIFICATION,
            "someOtherCommand",
        ] {
            assert_eq!(Command::from_method(method, None).method(), method);
        }
    }

    #[test]
    fn test_trip_scenario() {
        let platform = MockPlatform::new();
        let mut bridge = bridge(&platform);

        assert_eq!(bridge.handle(Command::AcquireWakeLock), Reply::Ack);
        assert_eq!(bridge.lock_state(), LockState::Held);

        let reply = bridge.handle(Command::UpdateNotification {
            text: Some("En route to pickup".into()),
        });
        assert_eq!(reply, Reply::Ack);
        assert_eq!(
            bridge.session().last_notification.as_deref(),
            Some("En route to pickup")
        );

        assert_eq!(bridge.handle(Command::ReleaseWakeLock), Reply::Ack);
        assert_eq!(bridge.lock_state(), LockState::NoLock);

        assert_eq!(bridge.handle(Command::ReleaseWakeLock), Reply::Ack);
        assert_eq!(bridge.lock_state(), LockState::NoLock);
        assert_eq!(platform.held_lock_count(), 0);
    }

    #[test]
    fn test_update_without_text_uses_default() {
        let platform = MockPlatform::new();
        let mut bridge = bridge(&platform);

        bridge.handle(Command::UpdateNotification { text: None });

        assert_eq!(
            platform.active_notification(1001).unwrap().text,
            "Trip in progress"
        );
    }

    #[test]
    fn test_unrecognized_command_changes_nothing() {
        let platform = MockPlatform::new();
        let mut bridge = bridge(&platform);
        let before = bridge.session();

        let reply = bridge.handle(Command::Unrecognized {
            method: "someOtherCommand".into(),
        });

        assert_eq!(reply, Reply::NotImplemented);
        assert_eq!(bridge.session(), before);
        assert_eq!(platform.total_acquisitions(), 0);
        assert!(platform.posted_notifications().is_empty());
    }

    #[test]
    fn test_double_acquire_keeps_one_lock() {
        let platform = MockPlatform::new();
        let mut bridge = bridge(&platform);

        bridge.handle(Command::AcquireWakeLock);
        let first = bridge.session().wake_lock.unwrap().token;
        bridge.handle(Command::AcquireWakeLock);
        let session = bridge.session();

        assert_eq!(session.state, SessionState::Active);
        assert_ne!(session.wake_lock.unwrap().token, first);
        assert_eq!(platform.held_lock_count(), 1);
    }

    #[test]
    fn test_release_without_acquire_is_acknowledged() {
        let platform = MockPlatform::new();
        let mut bridge = bridge(&platform);

        assert_eq!(bridge.handle(Command::ReleaseWakeLock), Reply::Ack);
        assert_eq!(bridge.session().state, SessionState::Idle);
    }

    #[test]
    fn test_os_refusals_still_acknowledge() {
        let platform = MockPlatform::new();
        platform.deny_wake_locks(true);
        platform.deny_notifications(true);
        let mut bridge = bridge(&platform);

        assert_eq!(bridge.handle(Command::AcquireWakeLock), Reply::Ack);
        assert_eq!(
            bridge.handle(Command::UpdateNotification {
                text: Some("En route".into())
            }),
            Reply::Ack
        );

        let session = bridge.session();
        assert_eq!(session.state, SessionState::Idle);
        assert!(session.wake_lock.is_none());
        assert!(session.last_notification.is_none());
    }

    #[test]
    fn test_channel_created_at_construction() {
        let platform = MockPlatform::new();
        let mut bridge = bridge(&platform);
        bridge.handle(Command::UpdateNotification { text: None });
        bridge.handle(Command::UpdateNotification { text: None });

        assert_eq!(platform.channel_registrations().len(), 1);
    }

    #[test]
    fn test_acquired_lock_lasts_full_ceiling() {
        let platform = MockPlatform::new();
        let mut bridge = bridge(&platform);

        bridge.handle(Command::AcquireWakeLock);

        let lock = bridge.session().wake_lock.unwrap();
        assert_eq!((lock.expires_at - lock.acquired_at).num_minutes(), 30);
        assert_eq!(
            platform.last_wake_lock_request().unwrap().timeout,
            crate::config::WAKE_LOCK_TIMEOUT
        );
    }

    #[test]
    fn test_update_acknowledged_when_channel_setup_failed() {
        let platform = MockPlatform::new();
        platform.fail_channel_creation(true);
        let mut bridge = bridge(&platform);
        assert!(platform.channel_registrations().is_empty());

        platform.fail_channel_creation(false);
        let reply = bridge.handle(Command::UpdateNotification {
            text: Some("En route".into()),
        });

        assert_eq!(reply, Reply::Ack);
        assert_eq!(platform.channel_registrations().len(), 1);
        assert_eq!(bridge.session().last_notification.as_deref(), Some("En route"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let platform = MockPlatform::new();
        let mut config = Config::default();
        config.notification.channel_id = String::new();

        let result = ServiceBridge::new(platform.clone(), platform, &config);
        assert!(matches!(
            result,
            Err(crate::error::TripwakeError::ConfigValidationError(_))
        ));
    }

    #[test]
    fn test_shutdown_and_drop_release_lock() {
        let platform = MockPlatform::new();

        let mut bridge = bridge(&platform);
        bridge.handle(Command::AcquireWakeLock);
        bridge.shutdown();
        assert_eq!(platform.held_lock_count(), 0);

        bridge.handle(Command::AcquireWakeLock);
        assert_eq!(platform.held_lock_count(), 1);
        drop(bridge);
        assert_eq!(platform.held_lock_count(), 0);
    }
}
