//! Serializable outcome values.
//!
//! These are the structures that leave the process: the builder in
//! [`crate::Outcome`] assembles them, serde turns them into JSON for the
//! API layer.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// OutcomeError
// ---------------------------------------------------------------------------

/// One error entry inside an outcome.
///
/// `code` is machine-readable and stable (clients branch on it). `path`
/// points at the offending input field when there is one, and `message`
/// is free text for humans. Absent optionals serialize as `null` so the
/// wire shape is the same for every entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeError {
    /// Machine-readable error code, e.g. `"INVALID_CREDENTIALS"`.
    pub code: String,

    /// Input path the error refers to, if any.
    pub path: Option<String>,

    /// Human-readable explanation, if any.
    pub message: Option<String>,
}

impl OutcomeError {
    /// Creates an error entry.
    pub fn new(
        code: impl Into<String>,
        path: Option<&str>,
        message: Option<&str>,
    ) -> Self {
        Self {
            code: code.into(),
            path: path.map(str::to_owned),
            message: message.map(str::to_owned),
        }
    }
}

// ---------------------------------------------------------------------------
// OutcomeBody: the plain shape
// ---------------------------------------------------------------------------

/// The plain `{ success, errors }` shape.
///
/// Produced by [`Outcome::body`](crate::Outcome::body). `success` is
/// already reconciled with `errors`: it is never `true` while `errors` is
/// non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeBody {
    /// Whether the operation succeeded.
    pub success: bool,

    /// Ordered list of errors, oldest first.
    pub errors: Vec<OutcomeError>,
}

// ---------------------------------------------------------------------------
// OutcomeEnvelope: the full shape with extra fields
// ---------------------------------------------------------------------------

/// The `result` member of a full envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeResult {
    /// Whether the operation succeeded.
    pub success: bool,

    /// Ordered list of errors, oldest first.
    pub errors: Vec<OutcomeError>,

    /// Unique error codes in first-seen order.
    pub error_codes: Vec<String>,
}

/// A full response: the outcome under `result`, plus caller-supplied fields
/// merged in at the top level.
///
/// `#[serde(flatten)]` is what lets a mutation return its payload (the
/// logged-in user, the count of invalidated sessions, ...) next to the
/// outcome in a single round trip:
///
/// ```text
/// { "result": { "success": true, "errors": [], "errorCodes": [] },
///   "sessionId": "9f2c..." }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeEnvelope<T> {
    /// The outcome itself.
    pub result: EnvelopeResult,

    /// Extra fields, serialized alongside `result`.
    #[serde(flatten)]
    pub include: T,
}

impl<T> OutcomeEnvelope<T> {
    /// Shorthand for `self.result.success`.
    pub fn succeeded(&self) -> bool {
        self.result.success
    }

    /// Returns `true` if `code` is among the envelope's error codes.
    pub fn has_code(&self, code: &str) -> bool {
        self.result.error_codes.iter().any(|c| c == code)
    }
}
