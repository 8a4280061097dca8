//! Session queries.

use warden_session::{Projection, Session, SessionStore, SessionToken, User, UserDirectory, UserFilter, UserId};
use warden_status::{StatusTracker, StoreKind};

use crate::{ADMIN, CredentialVerifier, RequestContext, SessionView, Warden, WardenError};

impl<S, U, T, V> Warden<S, U, T, V>
where
    S: SessionStore,
    U: UserDirectory,
    T: StatusTracker,
    V: CredentialVerifier,
{
    /// Any session by id. Admin only.
    ///
    /// The view's user is the session's owner, resolved when the primary
    /// store is connected.
    ///
    /// # Errors
    /// [`WardenError::BadInput`] for a blank id, access errors from
    /// [`RequestContext::authorize`], and store errors.
    pub async fn session_by_id(
        &self,
        ctx: &RequestContext,
        session_id: &str,
    ) -> Result<Option<SessionView>, WardenError> {
        self.needs(StoreKind::Cache)?;
        let session_id = non_blank(session_id, "sessionId")?;
        ctx.authorize(Some(ADMIN), false, false)?;

        let Some(session) = self.store().fetch(&SessionToken::new(session_id)).await? else {
            return Ok(None);
        };
        let owner = self.owner_of(&session).await?;
        Ok(Some(SessionView::new(&session, owner)))
    }

    /// All live sessions of a user. Admins may list anyone's; other users
    /// only their own.
    ///
    /// # Errors
    /// As for [`session_by_id`](Self::session_by_id).
    pub async fn sessions_by_user(
        &self,
        ctx: &RequestContext,
        user_id: &str,
    ) -> Result<Vec<SessionView>, WardenError> {
        self.needs(StoreKind::Cache)?;
        let user_id = UserId::new(non_blank(user_id, "userId")?);
        let own = ctx.session().is_some_and(|s| s.user_id == user_id);
        ctx.authorize(Some(ADMIN), false, own)?;

        let sessions = self.store().find_all_by_user(&user_id).await?;
        let owner = match sessions.first() {
            Some(first) => self.owner_of(first).await?,
            None => None,
        };
        Ok(sessions
            .iter()
            .map(|session| SessionView::new(session, owner.clone()))
            .collect())
    }

    /// The logged-in user, if any.
    pub fn current_user<'a>(&self, ctx: &'a RequestContext) -> Option<&'a User> {
        ctx.user()
    }

    /// The request's own session, if any.
    pub fn current_session(&self, ctx: &RequestContext) -> Option<SessionView> {
        ctx.authenticated()
            .map(|auth| SessionView::new(&auth.session, Some(auth.user.clone())))
    }

    async fn owner_of(&self, session: &Session) -> Result<Option<User>, WardenError> {
        if !self.tracker().is_connected(StoreKind::Primary) {
            return Ok(None);
        }
        let owner = self
            .users()
            .find_one(&UserFilter::Id(session.user_id.clone()), Projection::WithoutPassword)
            .await?;
        Ok(owner)
    }
}

fn non_blank<'a>(value: &'a str, field: &str) -> Result<&'a str, WardenError> {
    let value = value.trim();
    if value.is_empty() {
        Err(WardenError::BadInput(field.to_string()))
    } else {
        Ok(value)
    }
}
