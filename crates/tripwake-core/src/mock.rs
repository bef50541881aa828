//! In-memory platform for tests and desktop development.
//!
//! [`MockPlatform`] implements both [`PowerManager`] and
//! [`NotificationManager`]. Clones share state, so a test keeps one clone to
//! inspect what the code under test did with another.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::platform::{
    NotificationChannel, NotificationContent, NotificationManager, PlatformError, PlatformResult,
    PowerManager, WakeLockHandle, WakeLockRequest,
};

/// A call the OS accepted, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEvent {
    /// A wake lock was granted.
    WakeLockAcquired(Uuid),
    /// A wake lock was explicitly released.
    WakeLockReleased(Uuid),
    /// A notification channel was registered.
    ChannelCreated(String),
    /// A notification was posted under this id.
    NotificationPosted(i32),
}

#[derive(Debug)]
struct MockState {
    events: Vec<MockEvent>,
    held: HashMap<Uuid, DateTime<Utc>>,
    acquisitions: usize,
    releases: usize,
    last_request: Option<WakeLockRequest>,
    deny_wake_locks: bool,
    fail_held_queries: bool,

    supports_channels: bool,
    fail_channel_creation: bool,
    deny_notifications: bool,
    channel_registrations: Vec<NotificationChannel>,
    posted: Vec<NotificationContent>,
    active: HashMap<i32, NotificationContent>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            held: HashMap::new(),
            acquisitions: 0,
            releases: 0,
            last_request: None,
            deny_wake_locks: false,
            fail_held_queries: false,
            supports_channels: true,
            fail_channel_creation: false,
            deny_notifications: false,
            channel_registrations: Vec::new(),
            posted: Vec::new(),
            active: HashMap::new(),
        }
    }
}

/// Shared-state fake of the host OS.
#[derive(Debug, Clone, Default)]
pub struct MockPlatform {
    state: Arc<Mutex<MockState>>,
}

impl MockPlatform {
    /// A platform that grants everything and supports notification channels.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A platform predating notification channels.
    #[must_use]
    pub fn without_channel_support() -> Self {
        let platform = Self::new();
        platform.lock().supports_channels = false;
        platform
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Refuse (or stop refusing) wake-lock requests.
    pub fn deny_wake_locks(&self, deny: bool) {
        self.lock().deny_wake_locks = deny;
    }

    /// Make `is_held` queries fail.
    pub fn fail_held_queries(&self, fail: bool) {
        self.lock().fail_held_queries = fail;
    }

    /// Make channel registration fail on an OS that supports channels.
    pub fn fail_channel_creation(&self, fail: bool) {
        self.lock().fail_channel_creation = fail;
    }

    /// Refuse notification posts, as after a permission revocation.
    pub fn deny_notifications(&self, deny: bool) {
        self.lock().deny_notifications = deny;
    }

    /// Drop every held lock, as the OS does when a timeout ceiling passes.
    pub fn expire_wake_locks(&self) {
        self.lock().held.clear();
    }

    /// Accepted OS calls, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<MockEvent> {
        self.lock().events.clone()
    }

    /// Locks the OS currently considers held.
    #[must_use]
    pub fn held_lock_count(&self) -> usize {
        let now = Utc::now();
        self.lock()
            .held
            .values()
            .filter(|expires_at| now < **expires_at)
            .count()
    }

    /// Granted acquisitions so far.
    #[must_use]
    pub fn total_acquisitions(&self) -> usize {
        self.lock().acquisitions
    }

    /// Explicit releases so far.
    #[must_use]
    pub fn total_releases(&self) -> usize {
        self.lock().releases
    }

    /// The most recent wake-lock request, granted or not.
    #[must_use]
    pub fn last_wake_lock_request(&self) -> Option<WakeLockRequest> {
        self.lock().last_request.clone()
    }

    /// Every channel registration call, in order.
    #[must_use]
    pub fn channel_registrations(&self) -> Vec<NotificationChannel> {
        self.lock().channel_registrations.clone()
    }

    /// Every accepted notification post, in order.
    #[must_use]
    pub fn posted_notifications(&self) -> Vec<NotificationContent> {
        self.lock().posted.clone()
    }

    /// Notifications currently shown, one per id.
    #[must_use]
    pub fn active_notification_count(&self) -> usize {
        self.lock().active.len()
    }

    /// The notification currently shown under `id`.
    #[must_use]
    pub fn active_notification(&self, id: i32) -> Option<NotificationContent> {
        self.lock().active.get(&id).cloned()
    }
}

impl PowerManager for MockPlatform {
    fn acquire(&mut self, request: &WakeLockRequest) -> PlatformResult<WakeLockHandle> {
        let mut state = self.lock();
        state.last_request = Some(request.clone());
        if state.deny_wake_locks {
            return Err(PlatformError::PermissionDenied {
                operation: "wake_lock.acquire".into(),
            });
        }

        let handle = WakeLockHandle::granted(request);
        state.held.insert(handle.token(), handle.expires_at());
        state.acquisitions += 1;
        state.events.push(MockEvent::WakeLockAcquired(handle.token()));
        Ok(handle)
    }

    fn is_held(&self, handle: &WakeLockHandle) -> PlatformResult<bool> {
        let state = self.lock();
        if state.fail_held_queries {
            return Err(PlatformError::Unavailable {
                operation: "wake_lock.is_held".into(),
                message: "power service not responding".into(),
            });
        }
        Ok(state
            .held
            .get(&handle.token())
            .is_some_and(|expires_at| Utc::now() < *expires_at))
    }

    fn release(&mut self, handle: WakeLockHandle) -> PlatformResult<()> {
        let mut state = self.lock();
        state.held.remove(&handle.token());
        state.releases += 1;
        state.events.push(MockEvent::WakeLockReleased(handle.token()));
        Ok(())
    }
}

impl NotificationManager for MockPlatform {
    fn supports_channels(&self) -> bool {
        self.lock().supports_channels
    }

    fn create_channel(&mut self, channel: &NotificationChannel) -> PlatformResult<()> {
        let mut state = self.lock();
        if !state.supports_channels {
            return Err(PlatformError::Internal {
                message: "notification channels are not available on this OS version".into(),
            });
        }
        if state.fail_channel_creation {
            return Err(PlatformError::Unavailable {
                operation: "notification.create_channel".into(),
                message: "notification service not responding".into(),
            });
        }
        state.channel_registrations.push(channel.clone());
        state.events.push(MockEvent::ChannelCreated(channel.id.clone()));
        Ok(())
    }

    fn notify(&mut self, content: &NotificationContent) -> PlatformResult<()> {
        let mut state = self.lock();
        if state.deny_notifications {
            return Err(PlatformError::PermissionDenied {
                operation: "notification.post".into(),
            });
        }
        state.posted.push(content.clone());
        state.active.insert(content.id, content.clone());
        state.events.push(MockEvent::NotificationPosted(content.id));
        Ok(())
    }
}
