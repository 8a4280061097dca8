//! Error types for the session layer.

use warden_status::StoreKind;

/// A backing store call failed.
///
/// Ordinary absence is never an error: lookups return `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store answered with a failure.
    #[error("store error: {0}")]
    Backend(String),

    /// A write would violate a uniqueness constraint (duplicate email,
    /// duplicate key).
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors the [`SessionGuard`](crate::SessionGuard) raises.
///
/// "No session" is not an error: the guard returns `Ok(None)` and the
/// request continues anonymously. Every variant here terminates the
/// request.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A store the operation depends on is not connected.
    #[error("{0} store is unavailable")]
    Unavailable(StoreKind),

    /// The stored user agent or client address differs from the
    /// request's. The session has been deleted.
    #[error("session fingerprint mismatch")]
    CredentialMismatch,

    /// The session's user no longer exists. The session has been deleted.
    #[error("account no longer exists")]
    AccountGone,

    /// A store call failed mid-validation; no session was handed out.
    #[error(transparent)]
    Store(#[from] StoreError),
}
