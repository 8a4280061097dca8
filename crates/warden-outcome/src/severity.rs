//! Log severities for errors routed through the logger.

use std::fmt;

/// How loudly [`Outcome::add_error_and_log`](crate::Outcome::add_error_and_log)
/// reports an error.
///
/// Maps one-to-one onto `tracing` levels; `Log` is the quiet, developer
/// level and lands on `DEBUG`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Something broke and an operator should look at it.
    Error,
    /// Unexpected but recoverable.
    Warn,
    /// Noteworthy, nothing wrong.
    Info,
    /// Developer detail.
    Log,
}

impl Severity {
    /// Emits `note` at this severity, tagged with `code` and `component`.
    pub(crate) fn emit(self, code: &str, note: Option<&str>, component: Option<&str>) {
        let note = note.unwrap_or("");
        let component = component.unwrap_or("outcome");
        match self {
            Self::Error => tracing::error!(code, component, "{note}"),
            Self::Warn => tracing::warn!(code, component, "{note}"),
            Self::Info => tracing::info!(code, component, "{note}"),
            Self::Log => tracing::debug!(code, component, "{note}"),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Log => write!(f, "log"),
        }
    }
}
