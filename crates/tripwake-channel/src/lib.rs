//! # tripwake-channel
//!
//! The command channel through which the application layer drives the
//! tripwake service bridge.
//!
//! - [`channel`] - [`MethodChannel`], the named endpoint owning the bridge
//! - [`codec`] - JSON method-call and response envelopes
//! - [`error`] - Transport-level errors
//! - [`logging`] - `tracing` subscriber setup for the host process

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(missing_docs)]

pub mod channel;
pub mod codec;
pub mod error;
pub mod logging;

pub use channel::MethodChannel;
pub use codec::{MethodCall, MethodResponse};
pub use error::{ChannelError, ChannelResult};
