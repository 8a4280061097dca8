//! `Warden` builder and request entry point.
//!
//! This ties the layers together: tracker → guard → request context. The
//! mutation and query operations live in their own modules as further
//! `impl Warden` blocks.

use warden_session::{GuardConfig, SessionConfig, SessionError, SessionGuard, SessionStore, UserDirectory};
use warden_status::{StatusTracker, StoreKind};

use crate::{CredentialVerifier, RequestContext, RequestMeta, WardenConfig, WardenError};

/// Permission that satisfies every permission check.
pub const ADMIN: &str = "ADMIN";

/// Builder for configuring a [`Warden`].
///
/// # Example
///
/// ```rust,ignore
/// let warden = WardenBuilder::new()
///     .config(WardenConfig::from_json(&document)?)
///     .build(store, users, status, verifier);
/// ```
pub struct WardenBuilder {
    config: WardenConfig,
}

impl WardenBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: WardenConfig::default(),
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: WardenConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.config.session = config;
        self
    }

    /// Sets the guard configuration.
    pub fn guard_config(mut self, config: GuardConfig) -> Self {
        self.config.guard = config;
        self
    }

    /// Sets the per-user session limit enforced at login.
    pub fn max_sessions_per_user(mut self, limit: usize) -> Self {
        self.config.max_sessions_per_user = limit;
        self
    }

    /// Wires the collaborators together.
    ///
    /// `store` and `users` are typically `Arc`s shared with other parts of
    /// the service; `tracker` is the same handle the reconnect controller
    /// and status consumer write to.
    pub fn build<S, U, T, V>(self, store: S, users: U, tracker: T, verifier: V) -> Warden<S, U, T, V>
    where
        S: SessionStore,
        U: UserDirectory,
        T: StatusTracker,
        V: CredentialVerifier,
    {
        let config = self.config.validated();
        let guard = SessionGuard::new(store, users, tracker, &config.session, config.guard.clone());
        tracing::info!(
            ttl_secs = config.session.ttl_secs,
            require_primary = config.guard.require_primary,
            max_sessions_per_user = config.max_sessions_per_user,
            "warden configured"
        );
        Warden {
            guard,
            verifier,
            config,
        }
    }
}

impl Default for WardenBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Session and connectivity-state core for one service.
///
/// Cheap to share: wrap it in an `Arc` and hand it to every request
/// handler. All methods take `&self`.
pub struct Warden<S, U, T, V> {
    pub(crate) guard: SessionGuard<S, U, T>,
    pub(crate) verifier: V,
    pub(crate) config: WardenConfig,
}

impl<S, U, T, V> Warden<S, U, T, V>
where
    S: SessionStore,
    U: UserDirectory,
    T: StatusTracker,
    V: CredentialVerifier,
{
    /// The validated configuration in use.
    pub fn config(&self) -> &WardenConfig {
        &self.config
    }

    /// The session store.
    pub fn store(&self) -> &S {
        self.guard.store()
    }

    /// The user directory.
    pub fn users(&self) -> &U {
        self.guard.users()
    }

    /// The connectivity tracker.
    pub fn tracker(&self) -> &T {
        self.guard.tracker()
    }

    /// Fails unless `store` is connected.
    ///
    /// # Errors
    /// [`SessionError::Unavailable`] wrapped in [`WardenError::Session`].
    pub fn needs(&self, store: StoreKind) -> Result<(), WardenError> {
        if self.tracker().is_connected(store) {
            Ok(())
        } else {
            tracing::debug!(%store, "operation needs an unavailable store");
            Err(SessionError::Unavailable(store).into())
        }
    }

    /// Builds the context for one request.
    ///
    /// A request without a bearer token (or with a blank one) is
    /// anonymous, and so is every request while the guard's stores are
    /// down. Otherwise the client address must be resolvable and the
    /// session goes through the guard.
    ///
    /// # Errors
    /// - [`WardenError::ClientAddressMissing`]
    /// - [`WardenError::Session`] for fingerprint mismatches, vanished
    ///   accounts and store failures
    pub async fn context(&self, meta: RequestMeta) -> Result<RequestContext, WardenError> {
        let Some(token) = meta.bearer_token() else {
            return Ok(RequestContext::anonymous(meta));
        };
        if !self.guard.stores_ready() {
            tracing::debug!("stores not connected, request runs anonymously");
            return Ok(RequestContext::anonymous(meta));
        }

        let fingerprint = meta.fingerprint(&self.config.client_ip_header)?;
        let session = self.guard.authenticate(Some(token), &fingerprint).await?;
        Ok(RequestContext::new(meta, session))
    }
}
