pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryUserStore;
pub use models::{NewUser, User, UserView};
pub use postgres::PgUserStore;

/// Errors surfaced by a [`UserStore`]
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    /// A uniqueness constraint rejected the write
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Persistence collaborator for user records.
///
/// Lookups return `Ok(None)` for missing rows; every other failure is an error
/// the caller does not interpret beyond success or failure.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;

    /// Fails with [`StoreError::Conflict`] when the email is already taken
    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError>;

    /// All users ordered by id
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}
