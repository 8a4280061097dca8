//! Connectivity state and store identity.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// StoreKind
// ---------------------------------------------------------------------------

/// Which backing store a state refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// The system of record for users.
    Primary,
    /// The key-value store holding session records.
    Cache,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Cache => write!(f, "cache"),
        }
    }
}

// ---------------------------------------------------------------------------
// ConnectivityState
// ---------------------------------------------------------------------------

/// Health of one backing store, as last reported by its client.
///
/// ```text
///                ┌──────────────┐
///                │Uninitialized │ (process start)
///                └──────┬───────┘
///                       ▼
///   Error ◄──── Connecting ◄────┐
///     │             │           │
///     │             ▼           │
///     └───────► Connected ──► Disconnected
/// ```
///
/// The diagram shows the usual flow only; the tracker accepts any state
/// after any other.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityState {
    /// No connection attempt has been made yet.
    #[default]
    Uninitialized,
    /// A connection attempt (or retry loop) is in progress.
    Connecting,
    /// The store is reachable and usable.
    Connected,
    /// The connection was lost or closed.
    Disconnected,
    /// The client reported an error it won't retry on its own.
    Error,
}

impl ConnectivityState {
    /// Returns `true` only for [`Connected`](Self::Connected).
    pub fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }

    pub(crate) fn to_raw(self) -> u8 {
        match self {
            Self::Uninitialized => 0,
            Self::Connecting => 1,
            Self::Connected => 2,
            Self::Disconnected => 3,
            Self::Error => 4,
        }
    }

    /// Inverse of [`to_raw`](Self::to_raw). Unknown values map to `Error`
    /// so a corrupted slot reads as unusable rather than connected.
    pub(crate) fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Uninitialized,
            1 => Self::Connecting,
            2 => Self::Connected,
            3 => Self::Disconnected,
            _ => Self::Error,
        }
    }
}

impl fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::Disconnected => write!(f, "disconnected"),
            Self::Error => write!(f, "error"),
        }
    }
}

// ---------------------------------------------------------------------------
// StatusSnapshot
// ---------------------------------------------------------------------------

/// Both store states read at one moment. Handy for health endpoints and
/// logging; not a consistent cut (each field is its own atomic read).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// State of the primary store.
    pub primary: ConnectivityState,
    /// State of the cache store.
    pub cache: ConnectivityState,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ConnectivityState; 5] = [
        ConnectivityState::Uninitialized,
        ConnectivityState::Connecting,
        ConnectivityState::Connected,
        ConnectivityState::Disconnected,
        ConnectivityState::Error,
    ];

    #[test]
    fn test_raw_encoding_is_lossless() {
        for state in ALL {
            assert_eq!(ConnectivityState::from_raw(state.to_raw()), state);
        }
    }

    #[test]
    fn test_from_raw_unknown_reads_as_error() {
        assert_eq!(ConnectivityState::from_raw(200), ConnectivityState::Error);
    }

    #[test]
    fn test_is_connected_only_for_connected() {
        for state in ALL {
            assert_eq!(
                state.is_connected(),
                state == ConnectivityState::Connected,
                "{state}"
            );
        }
    }

    #[test]
    fn test_default_is_uninitialized() {
        assert_eq!(
            ConnectivityState::default(),
            ConnectivityState::Uninitialized
        );
    }

    #[test]
    fn test_display_is_lowercase() {
        assert_eq!(ConnectivityState::Disconnected.to_string(), "disconnected");
        assert_eq!(StoreKind::Cache.to_string(), "cache");
    }
}
