//! Unified error types for the tripwake core library.
//!
//! [`TripwakeError`] covers every failure that can leave the core. Only
//! construction can fail: OS-boundary failures never surface from command
//! handling, because the service bridge logs them and acknowledges the
//! command anyway. Components driven directly report those through their own
//! types ([`PlatformError`](crate::platform::PlatformError),
//! [`NotificationError`](crate::presenter::NotificationError)).

use thiserror::Error;

use crate::config::ConfigError;

/// The unified error type for tripwake operations.
#[derive(Debug, Error)]
pub enum TripwakeError {
    /// The configuration file was not found.
    #[error("Configuration file not found: {0}")]
    ConfigNotFound(String),

    /// The configuration could not be read or parsed.
    #[error("Failed to load configuration: {0}")]
    ConfigParseError(String),

    /// The configuration was parsed but contains invalid values.
    #[error("Configuration validation failed: {0}")]
    ConfigValidationError(String),
}

/// A specialized [`Result`] type for tripwake operations.
pub type Result<T> = std::result::Result<T, TripwakeError>;

impl TripwakeError {
    /// Machine-readable error code.
    #[inline]
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigNotFound(_) => "CONFIG_NOT_FOUND",
            Self::ConfigParseError(_) => "CONFIG_PARSE_ERROR",
            Self::ConfigValidationError(_) => "CONFIG_VALIDATION_ERROR",
        }
    }
}

// =============================================================================
// CONVERSIONS FROM MODULE-SPECIFIC ERRORS
// =============================================================================

impl From<ConfigError> for TripwakeError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NotFound(path) => Self::ConfigNotFound(path),
            ConfigError::ReadError { path, source } => {
                Self::ConfigParseError(format!("Failed to read {path}: {source}"))
            }
            ConfigError::ParseError(e) => Self::ConfigParseError(e.to_string()),
            ConfigError::ValidationError { field, message } => {
                Self::ConfigValidationError(format!("{field}: {message}"))
            }
            ConfigError::MultipleValidationErrors(errors) => {
                let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
                Self::ConfigValidationError(messages.join("; "))
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
