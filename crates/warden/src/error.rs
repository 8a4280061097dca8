//! Unified error type for Warden.

use warden_session::{SessionError, StoreError};

/// Top-level error that wraps all crate-specific errors.
///
/// Every variant terminates the request it occurred in. Each maps to a
/// machine-readable [`code`](Self::code) and an
/// [`http_status`](Self::http_status) hint for the API layer.
///
/// | Variant                          | code                    | status |
/// |----------------------------------|-------------------------|--------|
/// | `Session(CredentialMismatch)`    | `UNAUTHENTICATED`       | 401    |
/// | `Session(AccountGone)`           | `ACCOUNT_NOT_FOUND`     | 401    |
/// | `Session(Unavailable(_))`        | `INTERNAL_SERVER_ERROR` | 503    |
/// | `Session(Store(_))`, `Store(_)`  | `INTERNAL_SERVER_ERROR` | 500    |
/// | `Unauthenticated`                | `UNAUTHORIZED`          | 401    |
/// | `Forbidden`                      | `FORBIDDEN`             | 403    |
/// | `BadInput(_)`                    | `BAD_USER_INPUT`        | 400    |
/// | `ClientAddressMissing`           | `INTERNAL_SERVER_ERROR` | 500    |
/// | `Config(_)`, `Telemetry(_)`      | `INTERNAL_SERVER_ERROR` | 500    |
#[derive(Debug, thiserror::Error)]
pub enum WardenError {
    /// Session validation failed or a required store is down.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A store call failed outside session validation.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The operation requires a logged-in user.
    #[error("you need to be logged in to access this resource")]
    Unauthenticated,

    /// The user lacks the required permission.
    #[error("you do not have access to this resource")]
    Forbidden,

    /// Required input was missing or blank.
    #[error("input null or wrong type: {0}")]
    BadInput(String),

    /// No client address could be resolved from headers or the peer.
    #[error("cannot determine client address")]
    ClientAddressMissing,

    /// A configuration document could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// A global tracing subscriber is already installed.
    #[error("failed to install tracing subscriber: {0}")]
    Telemetry(#[from] tracing_subscriber::util::TryInitError),
}

impl WardenError {
    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Session(SessionError::CredentialMismatch) => "UNAUTHENTICATED",
            Self::Session(SessionError::AccountGone) => "ACCOUNT_NOT_FOUND",
            Self::Session(SessionError::Unavailable(_) | SessionError::Store(_))
            | Self::Store(_)
            | Self::ClientAddressMissing
            | Self::Config(_)
            | Self::Telemetry(_) => "INTERNAL_SERVER_ERROR",
            Self::Unauthenticated => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::BadInput(_) => "BAD_USER_INPUT",
        }
    }

    /// HTTP status hint.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Session(SessionError::CredentialMismatch | SessionError::AccountGone)
            | Self::Unauthenticated => 401,
            Self::Forbidden => 403,
            Self::BadInput(_) => 400,
            Self::Session(SessionError::Unavailable(_)) => 503,
            Self::Session(SessionError::Store(_))
            | Self::Store(_)
            | Self::ClientAddressMissing
            | Self::Config(_)
            | Self::Telemetry(_) => 500,
        }
    }
}
