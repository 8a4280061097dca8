//! Client-facing inputs and payloads.

use serde::{Deserialize, Serialize};
use warden_session::{Session, SessionToken, User};

/// What a client sees of a session: its id, its user and the address it
/// was created from. The user agent and version stay internal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: SessionToken,
    pub user: Option<User>,
    pub user_address: String,
}

impl SessionView {
    pub(crate) fn new(session: &Session, user: Option<User>) -> Self {
        Self {
            id: session.token.clone(),
            user,
            user_address: session.user_address.clone(),
        }
    }
}

/// Login mutation input. Both fields are required; they are optional
/// here so a missing field is reported as bad input, not a parse error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogInInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LogInInput {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }
}

/// Extra fields returned next to a login outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogInPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionToken>,
}

/// Extra fields returned next to a logout-everywhere outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogOutAllPayload {
    /// How many sessions were removed. Only set on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalidated_sessions: Option<usize>,
}
