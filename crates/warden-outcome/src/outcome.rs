//! The outcome builder.

use crate::{EnvelopeResult, OutcomeBody, OutcomeEnvelope, OutcomeError, Severity};

/// Incrementally built success/error result of an operation.
///
/// An `Outcome` starts out optimistic (`success = true`, no errors). The
/// first [`add_error`](Self::add_error) flips it to failed, and it stays
/// failed. Whatever the seed, a rendered outcome never reports success
/// while it carries errors.
///
/// `add_error` returns `&mut Self` so calls chain:
///
/// ```rust
/// use warden_outcome::Outcome;
///
/// let mut outcome = Outcome::new();
/// outcome
///     .add_error("BAD_EMAIL", Some("input.email"), None)
///     .add_error("BAD_PASSWORD", Some("input.password"), Some("too short"));
///
/// let body = outcome.body();
/// assert!(!body.success);
/// assert_eq!(body.errors.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    success: bool,
    errors: Vec<OutcomeError>,
    /// Unique codes in first-seen order. Kept alongside `errors` so the
    /// envelope doesn't have to dedup on every render.
    error_codes: Vec<String>,
}

impl Outcome {
    /// Creates an optimistic outcome: successful, no errors.
    pub fn new() -> Self {
        Self::seeded(true)
    }

    /// Creates an outcome with an explicit starting `success` flag.
    ///
    /// Seeding with `false` yields a failed outcome even without errors.
    /// Seeding with `true` is overridden as soon as an error is added.
    pub fn seeded(success: bool) -> Self {
        Self {
            success,
            errors: Vec::new(),
            error_codes: Vec::new(),
        }
    }

    /// Creates an outcome pre-filled with `errors`.
    pub fn with_errors(errors: impl IntoIterator<Item = OutcomeError>) -> Self {
        let mut outcome = Self::new();
        for error in errors {
            outcome.push(error);
        }
        outcome
    }

    /// Appends an error and marks the outcome as failed.
    pub fn add_error(
        &mut self,
        code: &str,
        path: Option<&str>,
        message: Option<&str>,
    ) -> &mut Self {
        self.push(OutcomeError::new(code, path, message));
        self
    }

    /// Same as [`add_error`](Self::add_error), and also reports the error
    /// through `tracing` at `severity`.
    ///
    /// Logging is a side effect only: the resulting outcome is identical to
    /// the one `add_error` would have produced.
    pub fn add_error_and_log(
        &mut self,
        code: &str,
        path: Option<&str>,
        message: Option<&str>,
        severity: Severity,
        note: Option<&str>,
        component: Option<&str>,
    ) -> &mut Self {
        self.push(OutcomeError::new(code, path, message));
        severity.emit(code, note, component);
        self
    }

    fn push(&mut self, error: OutcomeError) {
        self.success = false;
        if !self.error_codes.iter().any(|c| *c == error.code) {
            self.error_codes.push(error.code.clone());
        }
        self.errors.push(error);
    }

    /// Returns `true` if at least one error has been added.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Whether the outcome currently counts as a success.
    pub fn is_success(&self) -> bool {
        self.success && self.errors.is_empty()
    }

    /// All errors, oldest first.
    pub fn errors(&self) -> &[OutcomeError] {
        &self.errors
    }

    /// Unique error codes, in the order they were first added.
    pub fn error_codes(&self) -> &[String] {
        &self.error_codes
    }

    /// Renders the plain `{ success, errors }` shape.
    pub fn body(&self) -> OutcomeBody {
        OutcomeBody {
            success: self.is_success(),
            errors: self.errors.clone(),
        }
    }

    /// Renders the full envelope with `include` merged next to `result`.
    ///
    /// Pass `()` when there is nothing to include.
    pub fn envelope<T>(&self, include: T) -> OutcomeEnvelope<T> {
        OutcomeEnvelope {
            result: EnvelopeResult {
                success: self.is_success(),
                errors: self.errors.clone(),
                error_codes: self.error_codes.clone(),
            },
            include,
        }
    }

    /// Renders the outcome as a JSON value.
    ///
    /// With `full = true` the shape is
    /// `{ "result": { success, errors, errorCodes }, ...include }`; with
    /// `full = false` it is the plain `{ success, errors }` and `include`
    /// is ignored. The `result` key is reserved: an `include` entry with
    /// that name is replaced.
    ///
    /// Both shapes are the serde forms of [`OutcomeBody`] and
    /// [`EnvelopeResult`].
    #[cfg(feature = "json")]
    pub fn response(
        &self,
        full: bool,
        include: serde_json::Map<String, serde_json::Value>,
    ) -> serde_json::Value {
        if !full {
            return serde_json::json!(self.body());
        }

        let mut root = include;
        root.insert("result".into(), serde_json::json!(self.envelope(()).result));
        serde_json::Value::Object(root)
    }
}

impl Default for Outcome {
    fn default() -> Self {
        Self::new()
    }
}
