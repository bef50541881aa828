//! Ongoing foreground notification.
//!
//! [`NotificationPresenter`] registers the tracking channel once and keeps a
//! single notification (fixed id) up to date. Posting is best-effort: a
//! refusal comes back as a [`NotificationError`] for the caller to log.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::NotificationConfig;
use crate::platform::{
    Importance, NotificationChannel, NotificationContent, NotificationManager, PlatformError,
    Priority,
};

/// Title of the ongoing tracking notification.
pub const NOTIFICATION_TITLE: &str = "Location Tracking";

/// Notification failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotificationError {
    /// The OS refused the post, typically because the permission was revoked.
    #[error("Notification post denied ({operation})")]
    PostDenied {
        /// Operation the OS refused.
        operation: String,
    },

    /// Registering the notification channel failed.
    #[error("Notification channel setup failed: {0}")]
    ChannelSetupFailed(#[source] PlatformError),

    /// Any other platform failure while posting.
    #[error(transparent)]
    Platform(PlatformError),
}

/// Result type for notification operations.
pub type NotificationResult<T> = std::result::Result<T, NotificationError>;

/// What channel setup amounted to on this platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelSetup {
    /// The channel was registered with the OS.
    Registered,
    /// The OS has no channel concept; nothing to register.
    Unsupported,
}

/// Owner of the notification channel and the ongoing notification.
pub struct NotificationPresenter<N: NotificationManager> {
    manager: N,
    channel: NotificationChannel,
    channel_setup: Option<ChannelSetup>,
    notification_id: i32,
    small_icon: String,
    default_text: String,
    last_text: Option<String>,
}

impl<N: NotificationManager> NotificationPresenter<N> {
    /// Create the presenter and register the channel.
    ///
    /// A channel registration failure is logged. Setup is retried by the next
    /// [`ensure_channel_created`](Self::ensure_channel_created) or
    /// [`update`](Self::update) call.
    pub fn new(manager: N, config: &NotificationConfig) -> Self {
        let mut presenter = Self {
            manager,
            channel: NotificationChannel {
                id: config.channel_id.clone(),
                name: config.channel_name.clone(),
                description: config.channel_description.clone(),
                importance: Importance::High,
                show_badge: false,
                silent: true,
            },
            channel_setup: None,
            notification_id: config.notification_id,
            small_icon: config.small_icon.clone(),
            default_text: config.default_text.clone(),
            last_text: None,
        };

        if let Err(e) = presenter.ensure_channel_created() {
            warn!(error = %e, "Notification channel not registered");
        }
        presenter
    }

    /// Register the notification channel unless that already happened.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::ChannelSetupFailed`] if the OS rejects the
    /// registration.
    pub fn ensure_channel_created(&mut self) -> NotificationResult<ChannelSetup> {
        if let Some(setup) = self.channel_setup {
            return Ok(setup);
        }

        let setup = if self.manager.supports_channels() {
            self.manager
                .create_channel(&self.channel)
                .map_err(NotificationError::ChannelSetupFailed)?;
            info!(channel_id = %self.channel.id, "Notification channel registered");
            ChannelSetup::Registered
        } else {
            debug!("Platform has no notification channels, skipping setup");
            ChannelSetup::Unsupported
        };

        self.channel_setup = Some(setup);
        Ok(setup)
    }

    /// Post `text` as the body of the ongoing notification, replacing the
    /// previous one.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::PostDenied`] when the OS refuses the post
    /// and [`NotificationError::Platform`] for other platform failures.
    pub fn update(&mut self, text: &str) -> NotificationResult<()> {
        if let Err(e) = self.ensure_channel_created() {
            warn!(error = %e, "Posting without a registered notification channel");
        }

        let content = self.content(text);
        self.manager.notify(&content).map_err(|e| match e {
            PlatformError::PermissionDenied { operation } => {
                NotificationError::PostDenied { operation }
            }
            other => NotificationError::Platform(other),
        })?;

        debug!(id = content.id, text = %content.text, "Tracking notification posted");
        self.last_text = Some(content.text);
        Ok(())
    }

    fn content(&self, text: &str) -> NotificationContent {
        NotificationContent {
            id: self.notification_id,
            channel_id: self.channel.id.clone(),
            title: NOTIFICATION_TITLE.to_string(),
            text: text.to_string(),
            small_icon: self.small_icon.clone(),
            ongoing: true,
            priority: Priority::High,
            silent: true,
        }
    }

    /// Whether channel setup has completed (registered or not applicable).
    #[must_use]
    pub const fn channel_ready(&self) -> bool {
        self.channel_setup.is_some()
    }

    /// Body text used when a caller supplies none.
    #[must_use]
    pub fn default_text(&self) -> &str {
        &self.default_text
    }

    /// Body of the last notification the OS accepted.
    #[must_use]
    pub fn last_text(&self) -> Option<&str> {
        self.last_text.as_deref()
    }
}
