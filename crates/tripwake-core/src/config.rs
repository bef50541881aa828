//! Service configuration.
//!
//! Handles loading and validating the tripwake configuration:
//! - Wake-lock tag (the timeout is fixed at [`WAKE_LOCK_TIMEOUT`])
//! - Notification channel and ongoing-notification parameters
//! - Command channel name
//!
//! Every field has a default, so a missing file or a partial file is valid.

use std::path::Path;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hard ceiling on how long a single wake-lock grant may last (30 minutes).
pub const MAX_WAKE_LOCK_TIMEOUT_SECS: u64 = 30 * 60;

/// Timeout every wake-lock request carries. Not configurable: a shorter
/// ceiling would let the OS drop the lock mid-trip.
pub const WAKE_LOCK_TIMEOUT: Duration = Duration::from_secs(MAX_WAKE_LOCK_TIMEOUT_SECS);

/// Body text used when `updateNotification` carries no text.
pub const DEFAULT_NOTIFICATION_TEXT: &str = "Trip in progress";

/// `<reverse.dns.namespace>/<endpoint>`
static CHANNEL_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_]*(\.[A-Za-z][A-Za-z0-9_]*)+/[A-Za-z][A-Za-z0-9_]*$")
        .expect("channel name pattern is valid")
});

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    /// The configuration file exists but could not be read.
    #[error("Failed to read {path}: {source}")]
    ReadError {
        /// Path that failed.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid TOML for this schema.
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    /// A single field holds an invalid value.
    #[error("{field}: {message}")]
    ValidationError {
        /// Dotted field path.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// Several fields hold invalid values.
    #[error("{} validation errors", .0.len())]
    MultipleValidationErrors(Vec<ConfigError>),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Wake-lock settings.
    pub wake_lock: WakeLockConfig,

    /// Notification settings.
    pub notification: NotificationConfig,

    /// Command channel settings.
    pub channel: ChannelConfig,
}

/// Wake-lock settings.
///
/// Unknown keys are rejected so a stale `timeout_secs` entry fails loudly
/// instead of being ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WakeLockConfig {
    /// Tag shown in OS power diagnostics.
    pub tag: String,
}

impl Default for WakeLockConfig {
    fn default() -> Self {
        Self {
            tag: "ridetrack:LocationTracking".to_string(),
        }
    }
}

/// Notification channel and ongoing-notification settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Channel identifier registered with the OS.
    pub channel_id: String,

    /// User-visible channel name.
    pub channel_name: String,

    /// User-visible channel description.
    pub channel_description: String,

    /// Fixed id of the ongoing notification.
    pub notification_id: i32,

    /// Body text used when a caller supplies none.
    pub default_text: String,

    /// Small icon resource name.
    pub small_icon: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            channel_id: "location_tracking".to_string(),
            channel_name: "Location Tracking".to_string(),
            channel_description: "Shows while a trip is being tracked in the background"
                .to_string(),
            notification_id: 1001,
            default_text: DEFAULT_NOTIFICATION_TEXT.to_string(),
            small_icon: "ic_notification".to_string(),
        }
    }
}

/// Command channel settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Namespaced endpoint name, e.g. `com.ridetrack.app/location_service`.
    pub name: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            name: "com.ridetrack.app/location_service".to_string(),
        }
    }
}

impl Config {
    /// Load and validate configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, malformed or
    /// fails validation.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from `path`, falling back to defaults when the file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be used.
    pub fn load_or_default(path: impl AsRef<Path>) -> ConfigResult<Self> {
        match Self::load(path) {
            Err(ConfigError::NotFound(missing)) => {
                tracing::debug!(path = %missing, "No config file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Parse and validate configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is malformed or fails validation.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field, collecting all violations.
    ///
    /// # Errors
    ///
    /// Returns the single violation, or [`ConfigError::MultipleValidationErrors`].
    pub fn validate(&self) -> ConfigResult<()> {
        let mut errors = Vec::new();

        if self.wake_lock.tag.trim().is_empty() {
            errors.push(ConfigError::ValidationError {
                field: "wake_lock.tag",
                message: "must not be empty".into(),
            });
        }
        if self.notification.channel_id.trim().is_empty() {
            errors.push(ConfigError::ValidationError {
                field: "notification.channel_id",
                message: "must not be empty".into(),
            });
        }
        if self.notification.default_text.trim().is_empty() {
            errors.push(ConfigError::ValidationError {
                field: "notification.default_text",
                message: "must not be empty".into(),
            });
        }
        if !is_valid_channel_name(&self.channel.name) {
            errors.push(ConfigError::ValidationError {
                field: "channel.name",
                message: format!(
                    "'{}' is not of the form <namespace>/<endpoint>",
                    self.channel.name
                ),
            });
        }

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ConfigError::MultipleValidationErrors(errors)),
        }
    }
}

/// Check a command channel name (`com.example.app/endpoint`).
#[must_use]
pub fn is_valid_channel_name(name: &str) -> bool {
    CHANNEL_NAME_RE.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.notification.default_text, "Trip in progress");
        assert_eq!(WAKE_LOCK_TIMEOUT, Duration::from_secs(1800));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [notification]
            default_text = "Driving"
            "#,
        )
        .unwrap();
        assert_eq!(config.notification.default_text, "Driving");
        assert_eq!(config.wake_lock.tag, "ridetrack:LocationTracking");
        assert_eq!(config.notification.notification_id, 1001);
    }

    #[test]
    fn test_timeout_is_not_configurable() {
        let err = Config::from_toml_str(
            r#"
            [wake_lock]
            timeout_secs = 60
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_multiple_violations_are_collected() {
        let mut config = Config::default();
        config.wake_lock.tag = " ".into();
        config.channel.name = "location_service".into();

        match config.validate() {
            Err(ConfigError::MultipleValidationErrors(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected multiple errors, got {other:?}"),
        }
    }

    #[test]
    fn test_channel_name_validation() {
        assert!(is_valid_channel_name("com.ridetrack.app/location_service"));
        assert!(is_valid_channel_name("app.tracker/bridge"));
        assert!(!is_valid_channel_name("location_service"));
        assert!(!is_valid_channel_name("com.ridetrack.app/"));
        assert!(!is_valid_channel_name("/location_service"));
        assert!(!is_valid_channel_name("com..app/x"));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = Config::from_toml_str("[wake_lock\ntag = ").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tripwake.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[channel]\nname = \"com.example.rides/tracking\"").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.channel.name, "com.example.rides/tracking");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        assert!(matches!(Config::load(&path), Err(ConfigError::NotFound(_))));
        assert_eq!(Config::load_or_default(&path).unwrap(), Config::default());
    }
}
