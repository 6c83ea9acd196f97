use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::app::AppState;
use crate::database::models::task::{Task, TaskChanges};
use crate::error::ApiError;
use crate::middleware::{ApiJson, OwnerScope};
use crate::types::{parse_task_id, TaskId};

fn task_id(raw: &str) -> Result<TaskId, ApiError> {
    parse_task_id(raw).ok_or_else(|| ApiError::not_found("Task not found"))
}

/// GET /api/:user_id/tasks/:id - Get a single task
pub async fn get(
    OwnerScope(owner): OwnerScope,
    State(state): State<AppState>,
    Path((_, id)): Path<(String, String)>,
) -> Result<Json<Task>, ApiError> {
    let task = state.store.get(&owner, task_id(&id)?).await?;
    Ok(Json(task))
}

/// PUT /api/:user_id/tasks/:id - Partially update a task
pub async fn update(
    OwnerScope(owner): OwnerScope,
    State(state): State<AppState>,
    Path((_, id)): Path<(String, String)>,
    ApiJson(changes): ApiJson<TaskChanges>,
) -> Result<Json<Task>, ApiError> {
    let id = task_id(&id)?;
    let touch_only = changes.is_empty();
    let task = state.store.update(&owner, id, changes).await?;
    if touch_only {
        tracing::debug!("Touched task {} for {} without field changes", id, owner);
    } else {
        tracing::debug!("Updated task {} for {}", id, owner);
    }
    Ok(Json(task))
}

/// DELETE /api/:user_id/tasks/:id - Permanently delete a task
pub async fn delete(
    OwnerScope(owner): OwnerScope,
    State(state): State<AppState>,
    Path((_, id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let id = task_id(&id)?;
    state.store.delete(&owner, id).await?;
    tracing::debug!("Deleted task {} for {}", id, owner);
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/:user_id/tasks/:id/complete - Flip the completion flag
pub async fn complete(
    OwnerScope(owner): OwnerScope,
    State(state): State<AppState>,
    Path((_, id)): Path<(String, String)>,
) -> Result<Json<Task>, ApiError> {
    let id = task_id(&id)?;
    let task = state.store.toggle_complete(&owner, id).await?;
    tracing::debug!("Task {} for {} is now completed={}", id, owner, task.is_completed);
    Ok(Json(task))
}
