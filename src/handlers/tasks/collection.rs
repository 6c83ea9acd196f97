use axum::{extract::State, http::StatusCode, Json};

use crate::app::AppState;
use crate::database::models::task::{NewTask, Task};
use crate::error::ApiError;
use crate::middleware::{ApiJson, OwnerScope};

/// GET /api/:user_id/tasks - List the caller's tasks, newest first
pub async fn list(
    OwnerScope(owner): OwnerScope,
    State(state): State<AppState>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = state.store.list(&owner).await?;
    Ok(Json(tasks))
}

/// POST /api/:user_id/tasks - Create a task owned by the token subject
pub async fn create(
    OwnerScope(owner): OwnerScope,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewTask>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let task = state.store.create(&owner, payload).await?;
    tracing::debug!("Created task {} for {}", task.id, owner);
    Ok((StatusCode::CREATED, Json(task)))
}
