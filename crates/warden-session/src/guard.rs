//! The per-request session check.
//!
//! Every request that carries a bearer token passes through
//! [`SessionGuard::authenticate`] before any resolver runs:
//!
//! ```text
//!  token? ── no ──────────────────────────────────────→ Ok(None)
//!    │
//!  stores connected? ── no ───────────────────────────→ Ok(None)
//!    │
//!  fetch ── absent ───────────────────────────────────→ Ok(None)
//!    │
//!  fingerprint matches? ── no ──→ remove ─────────────→ Err(CredentialMismatch)
//!    │
//!  user exists? ── no ──→ remove ─────────────────────→ Err(AccountGone)
//!    │
//!  version += 1, update, expire(ttl) ─────────────────→ Ok(Some(session + user))
//! ```
//!
//! "No session" means the request runs anonymously. A down store degrades
//! to anonymous instead of blocking. A fingerprint mismatch never degrades:
//! the session is deleted and the request fails.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use warden_status::{StatusTracker, StoreKind};

use crate::{
    Fingerprint, Projection, Session, SessionConfig, SessionError, SessionStore, SessionToken,
    User, UserDirectory, UserFilter,
};

/// Guard settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Also require the primary store to be connected before touching the
    /// cache store. Default: `true`.
    pub require_primary: bool,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            require_primary: true,
        }
    }
}

/// A validated session together with its user, resolved for this request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedSession {
    pub session: Session,
    /// Loaded without the credential field.
    pub user: User,
}

/// Validates bearer tokens against the session store and user directory.
///
/// Generic over its three collaborators so tests can substitute fakes;
/// production wiring passes `Arc`s of the real stores.
pub struct SessionGuard<S, U, T> {
    store: S,
    users: U,
    tracker: T,
    ttl: Duration,
    config: GuardConfig,
}

impl<S, U, T> SessionGuard<S, U, T>
where
    S: SessionStore,
    U: UserDirectory,
    T: StatusTracker,
{
    /// Creates a guard that refreshes sessions to `session.ttl()`.
    pub fn new(store: S, users: U, tracker: T, session: &SessionConfig, config: GuardConfig) -> Self {
        Self {
            store,
            users,
            tracker,
            ttl: session.ttl(),
            config,
        }
    }

    /// The session store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The user directory.
    pub fn users(&self) -> &U {
        &self.users
    }

    /// The connectivity tracker.
    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    /// Whether the stores this guard depends on are connected.
    pub fn stores_ready(&self) -> bool {
        self.tracker.is_connected(StoreKind::Cache)
            && (!self.config.require_primary || self.tracker.is_connected(StoreKind::Primary))
    }

    /// Resolves `token` into a session for this request.
    ///
    /// `token` is the bearer value with the `Bearer ` prefix already
    /// stripped.
    ///
    /// # Returns
    /// - `Ok(None)`: no token, a store is down, or the token is unknown.
    ///   The request continues anonymously.
    /// - `Ok(Some(_))`: validated, version bumped, TTL reset.
    ///
    /// # Errors
    /// - [`SessionError::CredentialMismatch`]: the fingerprint differs.
    ///   The session has been deleted.
    /// - [`SessionError::AccountGone`]: the user no longer exists. The
    ///   session has been deleted.
    /// - [`SessionError::Store`]: a store call failed.
    pub async fn authenticate(
        &self,
        token: Option<&str>,
        fingerprint: &Fingerprint,
    ) -> Result<Option<AuthenticatedSession>, SessionError> {
        let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok(None);
        };

        if !self.stores_ready() {
            let snapshot = self.tracker.snapshot();
            tracing::debug!(
                primary = %snapshot.primary,
                cache = %snapshot.cache,
                "stores not connected, continuing without session"
            );
            return Ok(None);
        }

        let token = SessionToken::new(token);
        let Some(mut session) = self.store.fetch(&token).await? else {
            tracing::debug!(token = %token.prefix(), "unknown session token");
            return Ok(None);
        };

        if !fingerprint.matches(&session) {
            tracing::warn!(
                token = %token.prefix(),
                user_id = %session.user_id,
                "session fingerprint mismatch, revoking"
            );
            self.revoke(&token).await;
            return Err(SessionError::CredentialMismatch);
        }

        let user = self
            .users
            .find_one(&UserFilter::Id(session.user_id.clone()), Projection::WithoutPassword)
            .await?;
        let Some(user) = user else {
            tracing::warn!(
                token = %token.prefix(),
                user_id = %session.user_id,
                "session owner no longer exists, revoking"
            );
            self.revoke(&token).await;
            return Err(SessionError::AccountGone);
        };

        session.touch();
        self.store.update(&session).await?;
        if !self.store.expire(&token, self.ttl).await? {
            // Removed by a concurrent logout between fetch and here.
            tracing::debug!(token = %token.prefix(), "session vanished during revalidation");
            return Ok(None);
        }

        tracing::debug!(
            token = %token.prefix(),
            user_id = %session.user_id,
            version = session.version,
            "session revalidated"
        );
        Ok(Some(AuthenticatedSession { session, user }))
    }

    /// Deletes a session that failed validation. The request is denied
    /// whether or not the delete succeeds.
    async fn revoke(&self, token: &SessionToken) {
        if let Err(e) = self.store.remove(std::slice::from_ref(token)).await {
            tracing::error!(token = %token.prefix(), error = %e, "failed to revoke session");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemorySessionStore, MemoryUserDirectory, NewUser, UserId, UserType};
    use std::sync::Arc;
    use warden_status::{ConnectivityState, SharedStatus};

    type Guard = SessionGuard<Arc<MemorySessionStore>, Arc<MemoryUserDirectory>, SharedStatus>;

    fn connected() -> SharedStatus {
        let status = SharedStatus::new();
        status.set(StoreKind::Primary, ConnectivityState::Connected);
        status.set(StoreKind::Cache, ConnectivityState::Connected);
        status
    }

    fn guard(status: SharedStatus) -> Guard {
        SessionGuard::new(
            Arc::new(MemorySessionStore::default()),
            Arc::new(MemoryUserDirectory::new()),
            status,
            &SessionConfig::default(),
            GuardConfig::default(),
        )
    }

    async fn user(guard: &Guard) -> UserId {
        guard
            .users()
            .create(NewUser {
                user_type: UserType::Normal,
                email: "a@x.io".into(),
                password: Some("pw".into()),
                permissions: vec![],
                created_by: None,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_authenticate_without_token_returns_none() {
        let guard = guard(connected());

        let result = guard
            .authenticate(None, &Fingerprint::new("A", "1.2.3.4"))
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_authenticate_blank_token_returns_none() {
        let guard = guard(connected());

        let result = guard
            .authenticate(Some("   "), &Fingerprint::new("A", "1.2.3.4"))
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_authenticate_unknown_token_returns_none() {
        let guard = guard(connected());

        let result = guard
            .authenticate(Some("deadbeef"), &Fingerprint::new("A", "1.2.3.4"))
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_authenticate_returns_user_without_password() {
        let guard = guard(connected());
        let uid = user(&guard).await;
        let session = guard.store().create(&uid, "A", "1.2.3.4").await.unwrap();

        let auth = guard
            .authenticate(Some(session.token.as_str()), &Fingerprint::new("A", "1.2.3.4"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(auth.user.id, uid);
        assert!(auth.user.password.is_none());
        assert_eq!(auth.session.version, 1);
        assert!(auth.session.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_authenticate_primary_down_returns_none_when_required() {
        let status = connected();
        status.set(StoreKind::Primary, ConnectivityState::Disconnected);
        let guard = guard(status);
        let uid = user(&guard).await;
        let session = guard.store().create(&uid, "A", "1.2.3.4").await.unwrap();

        let result = guard
            .authenticate(Some(session.token.as_str()), &Fingerprint::new("A", "1.2.3.4"))
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_authenticate_primary_down_ignored_when_not_required() {
        let status = connected();
        status.set(StoreKind::Primary, ConnectivityState::Connecting);
        let guard = SessionGuard::new(
            Arc::new(MemorySessionStore::default()),
            Arc::new(MemoryUserDirectory::new()),
            status,
            &SessionConfig::default(),
            GuardConfig {
                require_primary: false,
            },
        );
        let uid = user(&guard).await;
        let session = guard.store().create(&uid, "A", "1.2.3.4").await.unwrap();

        let result = guard
            .authenticate(Some(session.token.as_str()), &Fingerprint::new("A", "1.2.3.4"))
            .await
            .unwrap();

        assert!(result.is_some());
    }

    #[tokio::test]
    async fn test_authenticate_address_mismatch_revokes() {
        let guard = guard(connected());
        let uid = user(&guard).await;
        let session = guard.store().create(&uid, "A", "1.2.3.4").await.unwrap();

        let err = guard
            .authenticate(Some(session.token.as_str()), &Fingerprint::new("A", "9.9.9.9"))
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::CredentialMismatch));
        assert!(guard.store().fetch(&session.token).await.unwrap().is_none());
    }
}
