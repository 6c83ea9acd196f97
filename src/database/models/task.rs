use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

use crate::config::TaskLimits;
use crate::database::store::StoreError;
use crate::types::TaskId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: TaskId,
    pub owner_id: String,
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/:user_id/tasks`. The owner always comes from the token.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of `PUT /api/:user_id/tasks/:id`. Absent fields are left untouched.
///
/// `description: null` clears the description; `null` for the other fields is
/// rejected during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskChanges {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub is_completed: Option<bool>,
}

// Wraps whatever is present in `Some` so that `default` only covers the absent case.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl NewTask {
    pub fn new(title: impl Into<String>, description: Option<String>) -> Self {
        Self {
            title: title.into(),
            description,
        }
    }

    pub fn validate(&self, limits: &TaskLimits) -> Result<(), StoreError> {
        validate_title(&self.title, limits)?;
        if let Some(description) = &self.description {
            validate_description(description, limits)?;
        }
        Ok(())
    }
}

impl TaskChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.is_completed.is_none()
    }

    pub fn validate(&self, limits: &TaskLimits) -> Result<(), StoreError> {
        if let Some(title) = &self.title {
            validate_title(title, limits)?;
        }
        if let Some(Some(description)) = &self.description {
            validate_description(description, limits)?;
        }
        Ok(())
    }

    /// Copy the supplied fields onto `task`. Timestamps are the caller's concern.
    pub fn apply(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(is_completed) = self.is_completed {
            task.is_completed = is_completed;
        }
    }
}

fn validate_title(title: &str, limits: &TaskLimits) -> Result<(), StoreError> {
    if title.trim().is_empty() {
        return Err(StoreError::Validation("Title cannot be empty".to_string()));
    }
    if title.chars().count() > limits.max_title_length {
        return Err(StoreError::Validation(format!(
            "Title must be at most {} characters",
            limits.max_title_length
        )));
    }
    Ok(())
}

fn validate_description(description: &str, limits: &TaskLimits) -> Result<(), StoreError> {
    if description.chars().count() > limits.max_description_length {
        return Err(StoreError::Validation(format!(
            "Description must be at most {} characters",
            limits.max_description_length
        )));
    }
    Ok(())
}
