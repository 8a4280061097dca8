//! In-process [`UserDirectory`].

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    DeleteResult, NewUser, Projection, StoreError, User, UserDirectory, UserFilter, UserId,
};

/// User collection kept in process memory. Emails are unique.
#[derive(Default)]
pub struct MemoryUserDirectory {
    users: RwLock<HashMap<UserId, User>>,
}

impl MemoryUserDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    /// Returns `true` if there are no users.
    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

impl UserDirectory for MemoryUserDirectory {
    async fn find_one(
        &self,
        filter: &UserFilter,
        projection: Projection,
    ) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        let found = match filter {
            UserFilter::Id(id) => users.get(id).cloned(),
            UserFilter::Email(_) => users.values().find(|u| filter.matches(u)).cloned(),
        };
        Ok(found.map(|user| match projection {
            Projection::Full => user,
            Projection::WithoutPassword => user.without_password(),
        }))
    }

    async fn count_documents(&self, filter: &UserFilter) -> Result<u64, StoreError> {
        let users = self.users.read().await;
        let count = users.values().filter(|u| filter.matches(u)).count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn create(&self, new: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == new.email) {
            return Err(StoreError::Conflict(format!(
                "email {} is already registered",
                new.email
            )));
        }

        let id = UserId::generate();
        let user = User {
            created_by: new.created_by.unwrap_or_else(|| id.clone()),
            id: id.clone(),
            user_type: new.user_type,
            email: new.email,
            password: new.password,
            permissions: new.permissions,
            created_at: Utc::now(),
            updated_at: None,
            updated_by: None,
            version: 0,
        };
        users.insert(id.clone(), user.clone());

        tracing::debug!(user_id = %id, "user created");
        Ok(user)
    }

    async fn delete_one(&self, filter: &UserFilter) -> Result<DeleteResult, StoreError> {
        let mut users = self.users.write().await;
        let id = users
            .values()
            .find(|u| filter.matches(u))
            .map(|u| u.id.clone());
        let deleted_count = match id {
            Some(id) => u64::from(users.remove(&id).is_some()),
            None => 0,
        };
        Ok(DeleteResult { deleted_count })
    }
}
