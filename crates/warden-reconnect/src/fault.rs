//! Client-side connection faults and how they are classified.

use warden_status::ConnectivityState;

/// An error reported by the cache-store client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectFault {
    /// The socket closed without the client asking for it.
    #[error("socket closed unexpectedly")]
    SocketClosed,

    /// The server refused the connection.
    #[error("connection refused")]
    ConnectionRefused,

    /// The server rejected the client's credentials.
    #[error("authentication rejected: {0}")]
    AuthRejected(String),

    /// Anything else the client surfaced.
    #[error("{0}")]
    Other(String),
}

/// Whether the retry loop absorbs a fault or hands it upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultClass {
    /// Part of normal reconnection; the retry loop swallows it.
    RetryHandled,
    /// Not something waiting will fix; the tracker goes to `Error` and the
    /// fault is reported.
    Escalate,
}

impl ConnectFault {
    /// Classifies the fault given the cache store's current state.
    ///
    /// - `SocketClosed` is always retry-handled.
    /// - `ConnectionRefused` is retry-handled only while already
    ///   `Connecting`; a refusal out of the blue is escalated.
    /// - Everything else escalates.
    pub fn classify(&self, current: ConnectivityState) -> FaultClass {
        match self {
            Self::SocketClosed => FaultClass::RetryHandled,
            Self::ConnectionRefused if current == ConnectivityState::Connecting => {
                FaultClass::RetryHandled
            }
            Self::ConnectionRefused | Self::AuthRejected(_) | Self::Other(_) => {
                FaultClass::Escalate
            }
        }
    }
}
