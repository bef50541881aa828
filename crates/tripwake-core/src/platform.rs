//! Host platform (OS) interfaces.
//!
//! The core never talks to the operating system directly. The host embeds a
//! pair of implementations:
//! - [`PowerManager`] for CPU wake locks
//! - [`NotificationManager`] for the foreground-notification channel and post
//!
//! Both are consumed through explicit ownership by the resource guard and the
//! notification presenter, never through ambient global lookups.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors reported by a host platform implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlatformError {
    /// The OS refused the request because a permission is missing or revoked.
    #[error("Permission denied for {operation}")]
    PermissionDenied {
        /// Operation that was refused (e.g. "wake_lock.acquire").
        operation: String,
    },

    /// The OS service backing the request is not reachable.
    #[error("{operation} unavailable: {message}")]
    Unavailable {
        /// Operation that could not be serviced.
        operation: String,
        /// Platform-provided detail.
        message: String,
    },

    /// Any other platform failure.
    #[error("Platform error: {message}")]
    Internal {
        /// Platform-provided detail.
        message: String,
    },
}

/// Result type for platform calls.
pub type PlatformResult<T> = std::result::Result<T, PlatformError>;

// ============================================================================
// Wake locks
// ============================================================================

/// Wake-lock level requested from the power manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WakeLockLevel {
    /// Keeps the CPU running; screen and keyboard may turn off.
    Partial,
}

/// A wake-lock request as handed to [`PowerManager::acquire`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WakeLockRequest {
    /// Stable identifying tag shown in OS power diagnostics.
    pub tag: String,
    /// Requested lock level.
    pub level: WakeLockLevel,
    /// Hard ceiling after which the OS drops the lock on its own.
    pub timeout: Duration,
    /// When `false`, each acquire replaces prior hold state instead of
    /// incrementing a counter.
    pub reference_counted: bool,
}

impl WakeLockRequest {
    /// Partial, non-reference-counted request with the given ceiling.
    #[must_use]
    pub fn partial(tag: impl Into<String>, timeout: Duration) -> Self {
        Self {
            tag: tag.into(),
            level: WakeLockLevel::Partial,
            timeout,
            reference_counted: false,
        }
    }
}

/// Opaque token for a wake lock granted by the OS.
///
/// Deliberately neither `Clone` nor `Copy`: exactly one owner holds a lock.
#[derive(PartialEq, Eq)]
pub struct WakeLockHandle {
    token: Uuid,
    tag: String,
    acquired_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl WakeLockHandle {
    /// Mint a handle for a lock granted just now.
    ///
    /// Platform implementations call this once the OS has granted `request`.
    #[must_use]
    pub fn granted(request: &WakeLockRequest) -> Self {
        let acquired_at = Utc::now();
        let expires_at = chrono::Duration::from_std(request.timeout)
            .ok()
            .and_then(|timeout| acquired_at.checked_add_signed(timeout))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            token: Uuid::new_v4(),
            tag: request.tag.clone(),
            acquired_at,
            expires_at,
        }
    }

    /// Unique token identifying this grant.
    #[must_use]
    pub const fn token(&self) -> Uuid {
        self.token
    }

    /// Tag the lock was requested with.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// When the OS granted the lock.
    #[must_use]
    pub const fn acquired_at(&self) -> DateTime<Utc> {
        self.acquired_at
    }

    /// When the OS will drop the lock if nobody releases it first.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

impl fmt::Debug for WakeLockHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WakeLockHandle")
            .field("token", &self.token)
            .field("tag", &self.tag)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// CPU wake-lock service of the host OS.
pub trait PowerManager: Send {
    /// Request a new wake lock.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS refuses to grant the lock.
    fn acquire(&mut self, request: &WakeLockRequest) -> PlatformResult<WakeLockHandle>;

    /// Whether the OS still considers `handle` held.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS cannot be queried.
    fn is_held(&self, handle: &WakeLockHandle) -> PlatformResult<bool>;

    /// Release a held lock, consuming its handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS rejects the release.
    fn release(&mut self, handle: WakeLockHandle) -> PlatformResult<()>;
}

// ============================================================================
// Notifications
// ============================================================================

/// Channel importance as understood by the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    /// Makes a sound and appears as a heads-up notification unless silenced.
    High,
}

/// Per-notification priority, used by OS versions without channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Shown prominently.
    High,
}

/// Notification channel registration parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationChannel {
    /// Channel identifier.
    pub id: String,
    /// User-visible channel name.
    pub name: String,
    /// User-visible channel description.
    pub description: String,
    /// Channel importance.
    pub importance: Importance,
    /// Whether the launcher badge is shown for this channel.
    pub show_badge: bool,
    /// Whether posts on this channel play a sound.
    pub silent: bool,
}

/// Content of the ongoing tracking notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationContent {
    /// Fixed notification id; reposting with the same id replaces it.
    pub id: i32,
    /// Channel the notification is posted on.
    pub channel_id: String,
    /// Title line.
    pub title: String,
    /// Body text.
    pub text: String,
    /// Small icon resource name.
    pub small_icon: String,
    /// Ongoing notifications cannot be swiped away.
    pub ongoing: bool,
    /// Priority for OS versions without channels.
    pub priority: Priority,
    /// Suppress sound and vibration.
    pub silent: bool,
}

/// Notification service of the host OS.
pub trait NotificationManager: Send {
    /// Whether this OS version has the notification-channel concept.
    fn supports_channels(&self) -> bool;

    /// Register a notification channel. Re-registering identical parameters
    /// is a no-op on the OS side.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS rejects the registration.
    fn create_channel(&mut self, channel: &NotificationChannel) -> PlatformResult<()>;

    /// Post or replace the notification identified by `content.id`.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::PermissionDenied`] when posting notifications
    /// is not allowed.
    fn notify(&mut self, content: &NotificationContent) -> PlatformResult<()>;
}
