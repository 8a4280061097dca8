//! Per-request context and access checks.

use warden_session::{AuthenticatedSession, Session, User};

use crate::{ADMIN, RequestMeta, WardenError};

/// Everything Warden knows about the caller of one request.
///
/// Built by [`Warden::context`](crate::Warden::context). The session, if
/// any, has already passed the guard.
#[derive(Debug, Clone)]
pub struct RequestContext {
    meta: RequestMeta,
    session: Option<AuthenticatedSession>,
}

impl RequestContext {
    pub(crate) fn new(meta: RequestMeta, session: Option<AuthenticatedSession>) -> Self {
        Self { meta, session }
    }

    /// A context with no session.
    pub fn anonymous(meta: RequestMeta) -> Self {
        Self::new(meta, None)
    }

    /// The request's headers and peer.
    pub fn meta(&self) -> &RequestMeta {
        &self.meta
    }

    /// The validated session and its user, if the request carried one.
    pub fn authenticated(&self) -> Option<&AuthenticatedSession> {
        self.session.as_ref()
    }

    /// The validated session, if any.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref().map(|auth| &auth.session)
    }

    /// The session's user, if any.
    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|auth| &auth.user)
    }

    /// Returns `true` if the request carries a validated session.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Checks that the caller may run an operation.
    ///
    /// - No session → [`WardenError::Unauthenticated`], even when `silent`.
    /// - No `permission` → `Ok(true)`; being logged in is enough.
    /// - The user holds `permission` or [`ADMIN`] → `Ok(true)`.
    /// - Otherwise `alt_condition` decides: `true` → `Ok(true)`.
    /// - Still not authorized → [`WardenError::Forbidden`], or `Ok(false)`
    ///   when `silent`.
    ///
    /// # Errors
    /// See above.
    pub fn authorize(
        &self,
        permission: Option<&str>,
        silent: bool,
        alt_condition: bool,
    ) -> Result<bool, WardenError> {
        let user = self.user().ok_or(WardenError::Unauthenticated)?;

        let Some(permission) = permission else {
            return Ok(true);
        };

        if user.has_permission(permission) || user.has_permission(ADMIN) || alt_condition {
            return Ok(true);
        }

        if silent {
            Ok(false)
        } else {
            tracing::debug!(user_id = %user.id, permission, "permission denied");
            Err(WardenError::Forbidden)
        }
    }
}
