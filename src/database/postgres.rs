use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use crate::config::TaskLimits;
use crate::database::models::task::{NewTask, Task, TaskChanges};
use crate::database::store::{StoreError, TaskStore};
use crate::types::{OwnerId, TaskId};

const COLUMNS: &str = "id, owner_id, title, description, is_completed, created_at, updated_at";

/// PostgreSQL-backed task store. Every statement filters on `owner_id`.
pub struct PgTaskStore {
    pool: PgPool,
    limits: TaskLimits,
}

impl PgTaskStore {
    pub fn new(pool: PgPool, limits: TaskLimits) -> Self {
        Self { pool, limits }
    }

    /// Create the `tasks` table and its listing index when missing
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id           BIGSERIAL PRIMARY KEY,
                owner_id     TEXT NOT NULL,
                title        TEXT NOT NULL,
                description  TEXT,
                is_completed BOOLEAN NOT NULL DEFAULT FALSE,
                created_at   TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at   TIMESTAMPTZ NOT NULL DEFAULT now(),
                CONSTRAINT tasks_updated_after_created CHECK (updated_at >= created_at)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS tasks_owner_created_idx ON tasks (owner_id, created_at DESC, id DESC)",
        )
        .execute(&self.pool)
        .await?;

        info!("Task schema ready");
        Ok(())
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn list(&self, owner: &OwnerId) -> Result<Vec<Task>, StoreError> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {COLUMNS} FROM tasks WHERE owner_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    async fn create(&self, owner: &OwnerId, new_task: NewTask) -> Result<Task, StoreError> {
        new_task.validate(&self.limits)?;

        let task = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (owner_id, title, description) VALUES ($1, $2, $3) RETURNING {COLUMNS}"
        ))
        .bind(owner.as_str())
        .bind(&new_task.title)
        .bind(&new_task.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(task)
    }

    async fn get(&self, owner: &OwnerId, id: TaskId) -> Result<Task, StoreError> {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {COLUMNS} FROM tasks WHERE id = $1 AND owner_id = $2"
        ))
        .bind(id)
        .bind(owner.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn update(&self, owner: &OwnerId, id: TaskId, changes: TaskChanges) -> Result<Task, StoreError> {
        changes.validate(&self.limits)?;

        let mut tx = self.pool.begin().await?;

        // Row lock held until commit so a concurrent toggle cannot interleave
        let mut task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {COLUMNS} FROM tasks WHERE id = $1 AND owner_id = $2 FOR UPDATE"
        ))
        .bind(id)
        .bind(owner.as_str())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound)?;

        changes.apply(&mut task);

        let updated = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks
             SET title = $3, description = $4, is_completed = $5,
                 updated_at = GREATEST(now(), created_at)
             WHERE id = $1 AND owner_id = $2
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(owner.as_str())
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.is_completed)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete(&self, owner: &OwnerId, id: TaskId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn toggle_complete(&self, owner: &OwnerId, id: TaskId) -> Result<Task, StoreError> {
        // Single statement: the flip reads and writes under the same row lock
        sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks
             SET is_completed = NOT is_completed,
                 updated_at = GREATEST(now(), created_at)
             WHERE id = $1 AND owner_id = $2
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(owner.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
