//! Users as the session layer sees them.
//!
//! The primary store owns the user collection. The session layer needs a
//! narrow slice of it: look a user up by id or email (optionally without
//! the credential field), count matches, create one, delete one. That
//! slice is the [`UserDirectory`] trait.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{StoreError, UserId};

/// Kind of account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserType {
    /// A person who logs in with email and password.
    Normal,
    /// A machine client. Cannot log in with a password.
    Api,
}

/// A user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub user_type: UserType,
    pub email: String,
    /// Stored credential. `None` when loaded with
    /// [`Projection::WithoutPassword`] or when the account has none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Capability names granted to the user (`"ADMIN"`, ...).
    #[serde(default)]
    pub permissions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: UserId,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<UserId>,
    pub version: u64,
}

impl User {
    /// Whether the user holds `permission`.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    /// A copy without the credential field.
    pub fn without_password(mut self) -> Self {
        self.password = None;
        self
    }
}

/// Input for [`UserDirectory::create`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub user_type: UserType,
    pub email: String,
    pub password: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Who is creating the account. `None` means self-created.
    pub created_by: Option<UserId>,
}

/// Selects users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFilter {
    Id(UserId),
    Email(String),
}

impl UserFilter {
    /// Whether `user` matches this filter.
    pub fn matches(&self, user: &User) -> bool {
        match self {
            Self::Id(id) => &user.id == id,
            Self::Email(email) => &user.email == email,
        }
    }
}

/// Which fields a lookup returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Projection {
    /// Every field, credential included.
    Full,
    /// Every field except the credential.
    #[default]
    WithoutPassword,
}

/// Result of [`UserDirectory::delete_one`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub deleted_count: u64,
}

/// Read/write access to the primary store's user collection.
///
/// Callers check the primary store's connectivity state first.
pub trait UserDirectory: Send + Sync + 'static {
    /// The first user matching `filter`, shaped by `projection`.
    fn find_one(
        &self,
        filter: &UserFilter,
        projection: Projection,
    ) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;

    /// How many users match `filter`.
    fn count_documents(
        &self,
        filter: &UserFilter,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Inserts a user. Fails with [`StoreError::Conflict`] when the email
    /// is taken.
    fn create(&self, user: NewUser) -> impl Future<Output = Result<User, StoreError>> + Send;

    /// Deletes the first user matching `filter`.
    fn delete_one(
        &self,
        filter: &UserFilter,
    ) -> impl Future<Output = Result<DeleteResult, StoreError>> + Send;
}

impl<U: UserDirectory> UserDirectory for Arc<U> {
    fn find_one(
        &self,
        filter: &UserFilter,
        projection: Projection,
    ) -> impl Future<Output = Result<Option<User>, StoreError>> + Send {
        (**self).find_one(filter, projection)
    }

    fn count_documents(
        &self,
        filter: &UserFilter,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send {
        (**self).count_documents(filter)
    }

    fn create(&self, user: NewUser) -> impl Future<Output = Result<User, StoreError>> + Send {
        (**self).create(user)
    }

    fn delete_one(
        &self,
        filter: &UserFilter,
    ) -> impl Future<Output = Result<DeleteResult, StoreError>> + Send {
        (**self).delete_one(filter)
    }
}
