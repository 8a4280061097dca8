//! The cache-store contract for session records.
//!
//! Warden doesn't talk to a particular key-value store. It defines
//! [`SessionStore`]: the handful of operations the session layer needs,
//! each one async because each one is a network round trip in production.
//! [`MemorySessionStore`](crate::MemorySessionStore) implements it
//! in-process; an adapter over a real cache store implements it over the
//! wire.
//!
//! Callers check the cache store's connectivity state before calling in.
//! The store does not re-check.

use std::sync::Arc;
use std::time::Duration;

use crate::{Session, SessionToken, StoreError, UserId};

/// Keyed session storage with per-record TTL.
///
/// # Trait bounds
///
/// `Send + Sync + 'static`, like every collaborator the request path
/// shares across tasks.
pub trait SessionStore: Send + Sync + 'static {
    /// Creates and persists a new session.
    ///
    /// The store picks the token. The record starts at `version` 0 with no
    /// `updated_at`, and lives for the configured TTL from now.
    fn create(
        &self,
        user_id: &UserId,
        user_agent: &str,
        user_address: &str,
    ) -> impl Future<Output = Result<Session, StoreError>> + Send;

    /// Looks up a session. Absence (never created, removed, or expired) is
    /// `Ok(None)`.
    fn fetch(
        &self,
        token: &SessionToken,
    ) -> impl Future<Output = Result<Option<Session>, StoreError>> + Send;

    /// Rewrites an existing record in place.
    ///
    /// Does **not** refresh the TTL; pair it with [`expire`](Self::expire).
    /// Updating a record that no longer exists is a no-op.
    fn update(&self, session: &Session) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Resets the TTL countdown to `ttl` without touching the record.
    ///
    /// Returns `false` when there was no live record to extend.
    fn expire(
        &self,
        token: &SessionToken,
        ttl: Duration,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Deletes every listed record. Returns how many existed.
    fn remove(
        &self,
        tokens: &[SessionToken],
    ) -> impl Future<Output = Result<usize, StoreError>> + Send;

    /// All live sessions owned by `user_id`.
    fn find_all_by_user(
        &self,
        user_id: &UserId,
    ) -> impl Future<Output = Result<Vec<Session>, StoreError>> + Send;
}

impl<S: SessionStore> SessionStore for Arc<S> {
    fn create(
        &self,
        user_id: &UserId,
        user_agent: &str,
        user_address: &str,
    ) -> impl Future<Output = Result<Session, StoreError>> + Send {
        (**self).create(user_id, user_agent, user_address)
    }

    fn fetch(
        &self,
        token: &SessionToken,
    ) -> impl Future<Output = Result<Option<Session>, StoreError>> + Send {
        (**self).fetch(token)
    }

    fn update(&self, session: &Session) -> impl Future<Output = Result<(), StoreError>> + Send {
        (**self).update(session)
    }

    fn expire(
        &self,
        token: &SessionToken,
        ttl: Duration,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send {
        (**self).expire(token, ttl)
    }

    fn remove(
        &self,
        tokens: &[SessionToken],
    ) -> impl Future<Output = Result<usize, StoreError>> + Send {
        (**self).remove(tokens)
    }

    fn find_all_by_user(
        &self,
        user_id: &UserId,
    ) -> impl Future<Output = Result<Vec<Session>, StoreError>> + Send {
        (**self).find_all_by_user(user_id)
    }
}
