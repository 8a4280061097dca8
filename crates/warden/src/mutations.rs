//! Session mutations: log in, log out, log out everywhere.
//!
//! Domain failures (already logged in, wrong password, too many sessions,
//! a delete that didn't stick) come back as [`Outcome`] envelopes.
//! Missing stores, bad input and unresolvable client addresses are
//! request-terminating [`WardenError`]s.

use unicode_normalization::UnicodeNormalization;
use warden_outcome::{Outcome, OutcomeEnvelope, Severity};
use warden_session::{
    Projection, SessionStore, SessionToken, UserDirectory, UserFilter, UserType,
};
use warden_status::{StatusTracker, StoreKind};

use crate::{
    CredentialVerifier, LogInInput, LogInPayload, LogOutAllPayload, RequestContext, Warden,
    WardenError,
};

const COMPONENT: &str = "session";

impl<S, U, T, V> Warden<S, U, T, V>
where
    S: SessionStore,
    U: UserDirectory,
    T: StatusTracker,
    V: CredentialVerifier,
{
    /// Logs a user in and opens a session bound to the request's
    /// fingerprint.
    ///
    /// Outcome error codes: `ALREADY_LOGGED_IN`, `INVALID_CREDENTIALS`,
    /// `TOO_MANY_SESSIONS`. On success the payload holds the user
    /// (without password) and the new session id.
    ///
    /// # Errors
    /// - [`WardenError::Session`] when the cache or primary store is down,
    ///   or a store call fails
    /// - [`WardenError::BadInput`] for a missing or blank email/password
    /// - [`WardenError::ClientAddressMissing`]
    pub async fn log_in(
        &self,
        ctx: &RequestContext,
        input: LogInInput,
    ) -> Result<OutcomeEnvelope<LogInPayload>, WardenError> {
        self.needs(StoreKind::Cache)?;

        let mut outcome = Outcome::new();
        if ctx.is_authenticated() {
            outcome.add_error("ALREADY_LOGGED_IN", None, None);
            return Ok(outcome.envelope(LogInPayload::default()));
        }

        let email = required(input.email, "email")?;
        let password = required(input.password, "password")?;

        self.needs(StoreKind::Primary)?;
        let user = self
            .users()
            .find_one(&UserFilter::Email(email), Projection::Full)
            .await?;

        let verified = user.as_ref().is_some_and(|user| {
            user.user_type == UserType::Normal
                && user
                    .password
                    .as_deref()
                    .is_some_and(|stored| self.verifier.verify(&password, stored))
        });
        let Some(user) = user.filter(|_| verified) else {
            tracing::debug!("login rejected");
            outcome.add_error("INVALID_CREDENTIALS", None, None);
            return Ok(outcome.envelope(LogInPayload::default()));
        };

        let open = self.store().find_all_by_user(&user.id).await?.len();
        if open >= self.config.max_sessions_per_user {
            tracing::info!(user_id = %user.id, open, "login refused, session limit reached");
            outcome.add_error("TOO_MANY_SESSIONS", None, None);
            return Ok(outcome.envelope(LogInPayload::default()));
        }

        let fingerprint = ctx.meta().fingerprint(&self.config.client_ip_header)?;
        let session = self
            .store()
            .create(&user.id, &fingerprint.user_agent, &fingerprint.user_address)
            .await?;
        // New sessions start at the configured TTL, not the store's default.
        self.store()
            .expire(&session.token, self.config.session.ttl())
            .await?;

        tracing::info!(
            user_id = %user.id,
            token = %session.token.prefix(),
            "user logged in"
        );
        Ok(outcome.envelope(LogInPayload {
            user: Some(user.without_password()),
            session_id: Some(session.token),
        }))
    }

    /// Ends the request's session.
    ///
    /// Outcome error codes: `NOT_LOGGED_IN`, `SESSION_DELETE_FAILED`
    /// (the record was still readable after removal).
    ///
    /// # Errors
    /// [`WardenError::Session`] when the cache store is down or a store
    /// call fails.
    pub async fn log_out(&self, ctx: &RequestContext) -> Result<OutcomeEnvelope<()>, WardenError> {
        self.needs(StoreKind::Cache)?;

        let mut outcome = Outcome::new();
        let Some(session) = ctx.session() else {
            outcome.add_error("NOT_LOGGED_IN", None, None);
            return Ok(outcome.envelope(()));
        };

        let token = &session.token;
        self.store().remove(std::slice::from_ref(token)).await?;

        if self.store().fetch(token).await?.is_some() {
            outcome.add_error_and_log(
                "SESSION_DELETE_FAILED",
                None,
                None,
                Severity::Error,
                Some("failed to log out a user"),
                Some(COMPONENT),
            );
        } else {
            tracing::info!(user_id = %session.user_id, token = %token.prefix(), "user logged out");
        }
        Ok(outcome.envelope(()))
    }

    /// Ends every session of the request's user, this one included.
    ///
    /// Only the sessions found at the start are removed and re-checked. A
    /// login that lands in between keeps its new session and does not
    /// count as a failed delete.
    ///
    /// Outcome error codes: `NOT_LOGGED_IN`, `SESSION_DELETE_ALL_FAILED`.
    /// On success the payload holds the number of invalidated sessions.
    ///
    /// # Errors
    /// [`WardenError::Session`] when the cache store is down or a store
    /// call fails.
    pub async fn log_out_all(
        &self,
        ctx: &RequestContext,
    ) -> Result<OutcomeEnvelope<LogOutAllPayload>, WardenError> {
        self.needs(StoreKind::Cache)?;

        let mut outcome = Outcome::new();
        let Some(session) = ctx.session() else {
            outcome.add_error("NOT_LOGGED_IN", None, None);
            return Ok(outcome.envelope(LogOutAllPayload::default()));
        };

        let tokens: Vec<SessionToken> = self
            .store()
            .find_all_by_user(&session.user_id)
            .await?
            .into_iter()
            .map(|s| s.token)
            .collect();
        self.store().remove(&tokens).await?;

        let mut leftover = 0usize;
        for token in &tokens {
            if self.store().fetch(token).await?.is_some() {
                leftover += 1;
            }
        }

        if leftover > 0 {
            outcome.add_error_and_log(
                "SESSION_DELETE_ALL_FAILED",
                None,
                None,
                Severity::Error,
                Some("failed to log a user out of all sessions"),
                Some(COMPONENT),
            );
            return Ok(outcome.envelope(LogOutAllPayload::default()));
        }

        tracing::info!(
            user_id = %session.user_id,
            count = tokens.len(),
            "user logged out everywhere"
        );
        Ok(outcome.envelope(LogOutAllPayload {
            invalidated_sessions: Some(tokens.len()),
        }))
    }
}

/// Unwraps a required text field, NFKD-normalized.
fn required(value: Option<String>, field: &str) -> Result<String, WardenError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.nfkd().collect()),
        _ => Err(WardenError::BadInput(field.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_missing_is_bad_input() {
        assert!(matches!(required(None, "email"), Err(WardenError::BadInput(f)) if f == "email"));
    }

    #[test]
    fn test_required_blank_is_bad_input() {
        assert!(required(Some("  ".into()), "password").is_err());
    }

    #[test]
    fn test_required_normalizes_nfkd() {
        // "é" precomposed (U+00E9) decomposes to "e" + U+0301.
        let value = required(Some("caf\u{e9}".into()), "password").unwrap();
        assert_eq!(value, "cafe\u{301}");
    }
}
