//! # tripwake-core
//!
//! Keeps a trip-tracking session alive while the host app is in the
//! background, by owning the OS wake lock and the ongoing foreground
//! notification.
//!
//! This crate provides:
//! - A resource guard holding at most one wake lock, with a 30 minute ceiling
//! - A notification presenter with create-once channel setup
//! - A service bridge dispatching the three tracking commands
//!
//! ## Architecture
//!
//! - [`bridge`] - Command enum, replies and the [`ServiceBridge`] dispatcher
//! - [`guard`] - Wake-lock ownership ([`ResourceGuard`])
//! - [`presenter`] - Notification channel and content ([`NotificationPresenter`])
//! - [`platform`] - Traits the host OS layer implements
//! - [`config`] - Configuration loading and validation
//! - [`error`] - Unified error types for the crate
//!
//! With the `mock-platform` feature, [`mock::MockPlatform`] provides an
//! in-memory OS for tests.
//!
//! ## Example
//!
//! ```ignore
//! use tripwake_core::{Command, Config, Reply, ServiceBridge};
//!
//! let mut bridge = ServiceBridge::new(power, notifications, &Config::default())?;
//! assert_eq!(bridge.handle(Command::AcquireWakeLock), Reply::Ack);
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(missing_docs)]

pub mod bridge;
pub mod config;
pub mod error;
pub mod guard;
pub mod platform;
pub mod presenter;

#[cfg(any(test, feature = "mock-platform"))]
pub mod mock;

// Re-export primary types for convenience
pub use bridge::{
    Command, Reply, ServiceBridge, SessionState, TrackingSession, WakeLockInfo,
    METHOD_ACQUIRE_WAKE_LOCK, METHOD_RELEASE_WAKE_LOCK, METHOD_UPDATE_NOTIFICATION,
};
pub use config::{
    is_valid_channel_name, ChannelConfig, Config, ConfigError, ConfigResult, NotificationConfig,
    WakeLockConfig, DEFAULT_NOTIFICATION_TEXT, MAX_WAKE_LOCK_TIMEOUT_SECS,
    WAKE_LOCK_TIMEOUT,
};
pub use error::{Result, TripwakeError};
pub use guard::{AcquireOutcome, LockState, ResourceGuard};
pub use platform::{
    NotificationChannel, NotificationContent, NotificationManager, PlatformError, PowerManager,
    WakeLockHandle, WakeLockRequest,
};
pub use presenter::{ChannelSetup, NotificationError, NotificationPresenter, NOTIFICATION_TITLE};
