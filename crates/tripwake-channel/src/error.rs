//! Channel error types.
//!
//! Only transport-level problems live here. A recognized or unrecognized
//! command never produces a [`ChannelError`]; those are answered through
//! [`MethodResponse`](crate::codec::MethodResponse) success or
//! not-implemented envelopes.

use thiserror::Error;
use tripwake_core::TripwakeError;

/// Errors raised by the command channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The request could not be decoded as a method call envelope.
    #[error("Malformed method call: {0}")]
    MalformedCall(#[from] serde_json::Error),

    /// The method call has an empty method name.
    #[error("Method call has no method name")]
    MissingMethod,

    /// The configured channel name is not `<namespace>/<endpoint>`.
    #[error("Invalid channel name: '{0}'")]
    InvalidChannelName(String),

    /// The core could not be set up.
    #[error(transparent)]
    Core(#[from] TripwakeError),
}

/// Result type for channel operations.
pub type ChannelResult<T> = std::result::Result<T, ChannelError>;

impl ChannelError {
    /// Machine-readable error code for error envelopes.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MalformedCall(_) => "MALFORMED_CALL",
            Self::MissingMethod => "MISSING_METHOD",
            Self::InvalidChannelName(_) => "INVALID_CHANNEL_NAME",
            Self::Core(e) => e.error_code(),
        }
    }
}
