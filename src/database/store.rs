use async_trait::async_trait;
use thiserror::Error;

use crate::database::models::task::{NewTask, Task, TaskChanges};
use crate::types::{OwnerId, TaskId};

/// Errors from task store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// The task does not exist or belongs to another owner. Callers cannot tell which.
    #[error("Task not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            // 57014 = query_canceled, raised when statement_timeout fires
            sqlx::Error::Database(db) if db.code().as_deref() == Some("57014") => {
                StoreError::Unavailable(err.to_string())
            }
            _ => StoreError::Database(err),
        }
    }
}

/// Owner-scoped CRUD over persisted tasks.
///
/// Every operation is keyed by owner; a task is never reachable by id alone.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// All tasks of `owner`, newest first (`created_at DESC, id DESC`)
    async fn list(&self, owner: &OwnerId) -> Result<Vec<Task>, StoreError>;

    async fn create(&self, owner: &OwnerId, new_task: NewTask) -> Result<Task, StoreError>;

    async fn get(&self, owner: &OwnerId, id: TaskId) -> Result<Task, StoreError>;

    /// Apply a partial update and refresh `updated_at`
    async fn update(&self, owner: &OwnerId, id: TaskId, changes: TaskChanges) -> Result<Task, StoreError>;

    async fn delete(&self, owner: &OwnerId, id: TaskId) -> Result<(), StoreError>;

    /// Flip `is_completed` atomically and refresh `updated_at`
    async fn toggle_complete(&self, owner: &OwnerId, id: TaskId) -> Result<Task, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}
