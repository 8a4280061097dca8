//! Error types for the reconnect layer.

use crate::ConnectFault;

/// Errors surfaced by [`ControllerHandle`](crate::ControllerHandle) and
/// the [`reconnect`](crate::reconnect) loop.
#[derive(Debug, thiserror::Error)]
pub enum ReconnectError {
    /// The controller task has stopped; events can't be delivered.
    #[error("reconnect controller is no longer running")]
    ControllerClosed,

    /// The client hit a fault the retry loop doesn't handle. The tracker
    /// already reads `Error`; the caller decides whether this is fatal.
    #[error("cache store connection failed: {0}")]
    Escalated(#[source] ConnectFault),
}
