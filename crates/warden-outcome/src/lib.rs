//! Outcome envelopes for Warden.
//!
//! Every mutating operation in Warden (log in, log out, log out
//! everywhere, ...) answers with the same shape:
//!
//! ```text
//! { success: bool, errors: [{ code, path?, message? }] }
//! ```
//!
//! This crate defines that shape and the builder that produces it:
//!
//! - **Builder** ([`Outcome`]): starts optimistic, flips to failed on the
//!   first error, and remembers which error codes it has seen.
//! - **Types** ([`OutcomeBody`], [`OutcomeEnvelope`], [`OutcomeError`]):
//!   the serializable values handed back to callers.
//! - **Severity** ([`Severity`]): how loudly an error is logged when it is
//!   added with [`Outcome::add_error_and_log`].
//!
//! # Where it sits
//!
//! An `Outcome` is data, not an error type. Failures that should end a
//! request (bad credentials fingerprint, store down) are raised as real
//! errors by the layers above; failures the caller is expected to branch
//! on (`INVALID_CREDENTIALS`, `TOO_MANY_SESSIONS`) travel inside an
//! `Outcome`.
//!
//! ```text
//! Operation (warden) → Outcome (this crate) → caller (JSON / typed struct)
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod outcome;
mod severity;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use outcome::Outcome;
pub use severity::Severity;
pub use types::{EnvelopeResult, OutcomeBody, OutcomeEnvelope, OutcomeError};
