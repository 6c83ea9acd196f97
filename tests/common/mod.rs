#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use todo_api::app::{self, AppState};
use todo_api::auth::{TokenIssuer, TokenVerifier};
use todo_api::config::AppConfig;
use todo_api::database::{MemoryTaskStore, NewTask, StoreError, Task, TaskChanges, TaskStore};
use todo_api::types::{OwnerId, TaskId};

pub const SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub store: Arc<CountingStore>,
    issuer: TokenIssuer,
}

impl TestApp {
    pub fn token(&self, user: &str) -> String {
        self.issuer.issue(user).expect("issue token")
    }

    pub fn tasks_url(&self, owner: &str) -> String {
        format!("{}/api/{}/tasks", self.base_url, owner)
    }

    pub fn task_url(&self, owner: &str, id: impl std::fmt::Display) -> String {
        format!("{}/api/{}/tasks/{}", self.base_url, owner, id)
    }

    /// POST a task as `user` under their own path and return the response body
    pub async fn create_task(&self, user: &str, body: Value) -> Result<Value> {
        let res = self
            .client
            .post(self.tasks_url(user))
            .bearer_auth(self.token(user))
            .json(&body)
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create failed: {}", res.status());
        Ok(res.json().await?)
    }
}

/// Start the real router over a fresh in-memory store on a free port
pub async fn spawn_app() -> Result<TestApp> {
    spawn_app_with(|_| None).await
}

pub async fn spawn_app_with<F>(extra: F) -> Result<TestApp>
where
    F: Fn(&str) -> Option<String>,
{
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;

    let config = AppConfig::from_lookup(|key| {
        extra(key).or_else(|| match key {
            "JWT_SECRET" => Some(SECRET.to_string()),
            "API_PORT" => Some(port.to_string()),
            "API_ENABLE_REQUEST_LOGGING" => Some("false".to_string()),
            _ => None,
        })
    });

    let store = Arc::new(CountingStore::new(MemoryTaskStore::new(config.tasks)));
    let verifier = TokenVerifier::new(&config.security.jwt_secret, config.security.jwt_leeway_secs)?;
    let router = app::app(AppState::new(store.clone(), verifier), &config);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    Ok(TestApp {
        base_url: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
        store,
        issuer: TokenIssuer::new(SECRET, 1)?,
    })
}

/// Memory store that records how many operations reached it
pub struct CountingStore {
    inner: MemoryTaskStore,
    calls: AtomicUsize,
}

impl CountingStore {
    fn new(inner: MemoryTaskStore) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl TaskStore for CountingStore {
    async fn list(&self, owner: &OwnerId) -> Result<Vec<Task>, StoreError> {
        self.hit();
        self.inner.list(owner).await
    }

    async fn create(&self, owner: &OwnerId, new_task: NewTask) -> Result<Task, StoreError> {
        self.hit();
        self.inner.create(owner, new_task).await
    }

    async fn get(&self, owner: &OwnerId, id: TaskId) -> Result<Task, StoreError> {
        self.hit();
        self.inner.get(owner, id).await
    }

    async fn update(&self, owner: &OwnerId, id: TaskId, changes: TaskChanges) -> Result<Task, StoreError> {
        self.hit();
        self.inner.update(owner, id, changes).await
    }

    async fn delete(&self, owner: &OwnerId, id: TaskId) -> Result<(), StoreError> {
        self.hit();
        self.inner.delete(owner, id).await
    }

    async fn toggle_complete(&self, owner: &OwnerId, id: TaskId) -> Result<Task, StoreError> {
        self.hit();
        self.inner.toggle_complete(owner, id).await
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.inner.health_check().await
    }
}
