use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::config::TaskLimits;
use crate::database::models::task::{NewTask, Task, TaskChanges};
use crate::database::store::{StoreError, TaskStore};
use crate::types::{OwnerId, TaskId};

/// Task store held in process memory, for local development and tests.
///
/// Every mutation holds the write lock for its whole read-modify-write, so
/// concurrent toggles and updates on one task serialize.
pub struct MemoryTaskStore {
    limits: TaskLimits,
    inner: RwLock<Inner>,
}

struct Inner {
    next_id: TaskId,
    tasks: BTreeMap<TaskId, Task>,
}

impl MemoryTaskStore {
    pub fn new(limits: TaskLimits) -> Self {
        Self {
            limits,
            inner: RwLock::new(Inner {
                next_id: 1,
                tasks: BTreeMap::new(),
            }),
        }
    }
}

impl Default for MemoryTaskStore {
    fn default() -> Self {
        Self::new(TaskLimits::default())
    }
}

impl Inner {
    fn owned_mut(&mut self, owner: &OwnerId, id: TaskId) -> Result<&mut Task, StoreError> {
        self.tasks
            .get_mut(&id)
            .filter(|task| task.owner_id == owner.as_str())
            .ok_or(StoreError::NotFound)
    }
}

fn touch(task: &mut Task) {
    task.updated_at = Utc::now().max(task.created_at);
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn list(&self, owner: &OwnerId) -> Result<Vec<Task>, StoreError> {
        let inner = self.inner.read().await;
        let mut tasks: Vec<Task> = inner
            .tasks
            .values()
            .filter(|task| task.owner_id == owner.as_str())
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(tasks)
    }

    async fn create(&self, owner: &OwnerId, new_task: NewTask) -> Result<Task, StoreError> {
        new_task.validate(&self.limits)?;

        let mut inner = self.inner.write().await;
        let id = inner.next_id;
        inner.next_id += 1;

        let now = Utc::now();
        let task = Task {
            id,
            owner_id: owner.as_str().to_string(),
            title: new_task.title,
            description: new_task.description,
            is_completed: false,
            created_at: now,
            updated_at: now,
        };
        inner.tasks.insert(id, task.clone());
        Ok(task)
    }

    async fn get(&self, owner: &OwnerId, id: TaskId) -> Result<Task, StoreError> {
        let inner = self.inner.read().await;
        inner
            .tasks
            .get(&id)
            .filter(|task| task.owner_id == owner.as_str())
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, owner: &OwnerId, id: TaskId, changes: TaskChanges) -> Result<Task, StoreError> {
        changes.validate(&self.limits)?;

        let mut inner = self.inner.write().await;
        let task = inner.owned_mut(owner, id)?;
        changes.apply(task);
        touch(task);
        Ok(task.clone())
    }

    async fn delete(&self, owner: &OwnerId, id: TaskId) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.owned_mut(owner, id)?;
        inner.tasks.remove(&id);
        Ok(())
    }

    async fn toggle_complete(&self, owner: &OwnerId, id: TaskId) -> Result<Task, StoreError> {
        let mut inner = self.inner.write().await;
        let task = inner.owned_mut(owner, id)?;
        task.is_completed = !task.is_completed;
        touch(task);
        Ok(task.clone())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
