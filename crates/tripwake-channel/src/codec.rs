//! JSON envelopes for the command channel.
//!
//! Requests:
//!
//! ```text
//! {"method": "updateNotification", "arguments": {"text": "En route to pickup"}}
//! ```
//!
//! Responses, one of:
//!
//! ```text
//! {"status": "success", "result": true}
//! {"status": "not_implemented", "method": "someOtherCommand"}
//! {"status": "error", "code": "MALFORMED_CALL", "message": "..."}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tripwake_core::{Command, Reply};

use crate::error::{ChannelError, ChannelResult};

/// Inbound method call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    /// Method name, e.g. `acquireWakeLock`.
    pub method: String,

    /// Method arguments; absent and `null` are equivalent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
}

impl MethodCall {
    /// A call without arguments.
    #[must_use]
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            arguments: None,
        }
    }

    /// A call with arguments.
    #[must_use]
    pub fn with_arguments(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments: Some(arguments),
        }
    }

    /// Decode a call from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a call envelope or the method
    /// name is empty.
    pub fn from_json(json: &str) -> ChannelResult<Self> {
        let call: Self = serde_json::from_str(json)?;
        if call.method.trim().is_empty() {
            return Err(ChannelError::MissingMethod);
        }
        Ok(call)
    }

    /// The `text` argument, if present as a string.
    #[must_use]
    pub fn text_argument(&self) -> Option<&str> {
        self.arguments
            .as_ref()
            .and_then(|args| args.get("text"))
            .and_then(Value::as_str)
    }

    /// Convert into a core command.
    #[must_use]
    pub fn to_command(&self) -> Command {
        Command::from_method(&self.method, self.text_argument().map(ToString::to_string))
    }
}

/// Outbound response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MethodResponse {
    /// The command was handled.
    Success {
        /// Acknowledgement value.
        result: bool,
    },

    /// The method is not part of the protocol.
    NotImplemented {
        /// The method name as received.
        method: String,
    },

    /// The request could not be decoded.
    Error {
        /// Machine-readable error code.
        code: String,
        /// Human-readable message.
        message: String,
    },
}

impl MethodResponse {
    /// Build the envelope for a core reply to `method`.
    #[must_use]
    pub fn from_reply(method: &str, reply: Reply) -> Self {
        match reply {
            Reply::Ack => Self::Success { result: true },
            Reply::NotImplemented => Self::NotImplemented {
                method: method.to_string(),
            },
        }
    }

    /// Build the envelope for a transport error.
    #[must_use]
    pub fn from_error(err: &ChannelError) -> Self {
        Self::Error {
            code: err.error_code().to_string(),
            message: err.to_string(),
        }
    }

    /// Encode as JSON text.
    #[must_use]
    pub fn to_json(&self) -> String {
        // Plain enum of strings and bools; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"status":"error","code":"ENCODE_FAILED","message":"response encoding failed"}"#
                .to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_call_without_arguments() {
        let call = MethodCall::from_json(r#"{"method": "acquireWakeLock"}"#).unwrap();
        assert_eq!(call.method, "acquireWakeLock");
        assert!(call.arguments.is_none());
        assert_eq!(call.to_command(), Command::AcquireWakeLock);
    }

    #[test]
    fn test_decode_update_with_text() {
        let call = MethodCall::from_json(
            r#"{"method": "updateNotification", "arguments": {"text": "En route to pickup"}}"#,
        )
        .unwrap();
        assert_eq!(
            call.to_command(),
            Command::UpdateNotification {
                text: Some("En route to pickup".into())
            }
        );
    }

    #[test]
    fn test_non_string_text_falls_back_to_default() {
        let call = MethodCall::with_arguments("updateNotification", json!({"text": 42}));
        assert_eq!(call.to_command(), Command::UpdateNotification { text: None });

        let call = MethodCall::with_arguments("updateNotification", Value::Null);
        assert_eq!(call.to_command(), Command::UpdateNotification { text: None });
    }

    #[test]
    fn test_malformed_calls() {
        assert!(matches!(
            MethodCall::from_json("not json"),
            Err(ChannelError::MalformedCall(_))
        ));
        assert!(matches!(
            MethodCall::from_json(r#"{"arguments": {}}"#),
            Err(ChannelError::MalformedCall(_))
        ));
        assert!(matches!(
            MethodCall::from_json(r#"{"method": " "}"#),
            Err(ChannelError::MissingMethod)
        ));
    }

    #[test]
    fn test_response_encoding() {
        assert_eq!(
            MethodResponse::from_reply("acquireWakeLock", Reply::Ack).to_json(),
            r#"{"status":"success","result":true}"#
        );
        assert_eq!(
            MethodResponse::from_reply("someOtherCommand", Reply::NotImplemented).to_json(),
            r#"{"status":"not_implemented","method":"someOtherCommand"}"#
        );
    }

    #[test]
    fn test_error_response() {
        let response = MethodResponse::from_error(&ChannelError::MissingMethod);
        let value: Value = serde_json::from_str(&response.to_json()).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["code"], "MISSING_METHOD");
    }
}
