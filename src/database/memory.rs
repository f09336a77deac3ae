use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{NewUser, StoreError, User, UserStore};

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    next_id: i64,
}

/// Process-local [`UserStore`] with the same uniqueness rules as the
/// Postgres store. Ids start at 1 and are never reused.
#[derive(Clone, Default)]
pub struct MemoryUserStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;

        if inner.users.iter().any(|u| u.email == new_user.email) {
            return Err(StoreError::Conflict(format!(
                "email '{}' is already registered",
                new_user.email
            )));
        }

        inner.next_id += 1;
        let user = User {
            id: inner.next_id,
            email: new_user.email,
            name: new_user.name,
            password_hash: new_user.password_hash,
            created_at: Utc::now(),
        };
        inner.users.push(user.clone());

        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        // Insertion order is id order
        Ok(self.inner.read().await.users.clone())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
