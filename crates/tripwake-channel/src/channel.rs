//! The named command channel.
//!
//! [`MethodChannel`] owns the [`ServiceBridge`] and answers one method call
//! at a time, either typed ([`MethodChannel::invoke`]) or as raw JSON
//! ([`MethodChannel::invoke_json`]).

use tracing::{debug, info_span, warn};
use tripwake_core::{
    is_valid_channel_name, Config, NotificationManager, PowerManager, ServiceBridge,
    TrackingSession,
};

use crate::codec::{MethodCall, MethodResponse};
use crate::error::{ChannelError, ChannelResult};

/// Command endpoint exposed to the application layer.
pub struct MethodChannel<P: PowerManager, N: NotificationManager> {
    name: String,
    bridge: ServiceBridge<P, N>,
}

impl<P: PowerManager, N: NotificationManager> MethodChannel<P, N> {
    /// Build the bridge from `config` and expose it under
    /// `config.channel.name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel name or the rest of the configuration
    /// is invalid.
    pub fn new(power: P, notifications: N, config: &Config) -> ChannelResult<Self> {
        if !is_valid_channel_name(&config.channel.name) {
            return Err(ChannelError::InvalidChannelName(config.channel.name.clone()));
        }
        let bridge = ServiceBridge::new(power, notifications, config)?;

        Ok(Self {
            name: config.channel.name.clone(),
            bridge,
        })
    }

    /// Channel name the host registers this endpoint under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handle a decoded method call.
    pub fn invoke(&mut self, call: &MethodCall) -> MethodResponse {
        let span = info_span!("method_call", channel = %self.name, method = %call.method);
        let _enter = span.enter();

        let reply = self.bridge.handle(call.to_command());
        debug!(?reply, "Method call handled");
        MethodResponse::from_reply(&call.method, reply)
    }

    /// Handle a JSON-encoded method call and return the JSON response.
    ///
    /// Undecodable requests produce an error envelope instead of reaching the
    /// bridge.
    pub fn invoke_json(&mut self, request: &str) -> String {
        let response = match MethodCall::from_json(request) {
            Ok(call) => self.invoke(&call),
            Err(e) => {
                warn!(channel = %self.name, error = %e, "Rejected method call");
                MethodResponse::from_error(&e)
            }
        };
        response.to_json()
    }

    /// Current tracking session.
    #[must_use]
    pub fn session(&self) -> TrackingSession {
        self.bridge.session()
    }

    /// Release everything the session holds. Dropping the channel does the
    /// same.
    pub fn shutdown(&mut self) {
        self.bridge.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tripwake_core::mock::MockPlatform;
    use tripwake_core::SessionState;

    fn channel(platform: &MockPlatform) -> MethodChannel<MockPlatform, MockPlatform> {
        MethodChannel::new(platform.clone(), platform.clone(), &Config::default()).unwrap()
    }

    #[test]
    fn test_default_channel_name() {
        let platform = MockPlatform::new();
        assert_eq!(
            channel(&platform).name(),
            "com.ridetrack.app/location_service"
        );
    }

    #[test]
    fn test_invalid_channel_name_is_rejected() {
        let platform = MockPlatform::new();
        let mut config = Config::default();
        config.channel.name = "location_service".into();

        let result = MethodChannel::new(platform.clone(), platform, &config);
        assert!(matches!(result, Err(ChannelError::InvalidChannelName(_))));
    }

    #[test]
    fn test_invalid_core_config_is_rejected() {
        let platform = MockPlatform::new();
        let mut config = Config::default();
        config.wake_lock.tag = String::new();

        let result = MethodChannel::new(platform.clone(), platform, &config);
        assert!(matches!(result, Err(ChannelError::Core(_))));
    }

    #[test]
    fn test_typed_invoke() {
        let platform = MockPlatform::new();
        let mut channel = channel(&platform);

        let response = channel.invoke(&MethodCall::new("acquireWakeLock"));
        assert_eq!(response, MethodResponse::Success { result: true });
        assert_eq!(channel.session().state, SessionState::Active);

        let response = channel.invoke(&MethodCall::new("someOtherCommand"));
        assert_eq!(
            response,
            MethodResponse::NotImplemented {
                method: "someOtherCommand".into()
            }
        );
    }

    #[test]
    fn test_shutdown_releases_lock() {
        let platform = MockPlatform::new();
        let mut channel = channel(&platform);

        channel.invoke(&MethodCall::new("acquireWakeLock"));
        assert_eq!(platform.held_lock_count(), 1);

        channel.shutdown();
        assert_eq!(platform.held_lock_count(), 0);
        assert_eq!(platform.total_releases(), 1);
        assert_eq!(channel.session().state, SessionState::Idle);
    }

    #[test]
    fn test_malformed_json_does_not_touch_session() {
        let platform = MockPlatform::new();
        let mut channel = channel(&platform);

        let response = channel.invoke_json("{\"method\": ");
        assert!(response.contains("\"status\":\"error\""));
        assert!(response.contains("MALFORMED_CALL"));
        assert_eq!(platform.total_acquisitions(), 0);
    }
}
