use anyhow::{anyhow, bail, Context};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::database::models::task::Task;
use crate::types::TaskId;

/// Thin REST client for `/api/:user_id/tasks`
pub struct TaskClient {
    http: reqwest::Client,
    base: Url,
    user: String,
    token: String,
}

impl TaskClient {
    pub fn new(server: &str, user: impl Into<String>, token: impl Into<String>) -> anyhow::Result<Self> {
        let base = Url::parse(server).with_context(|| format!("invalid server URL: {}", server))?;
        if base.cannot_be_a_base() {
            bail!("invalid server URL: {}", server);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            base,
            user: user.into(),
            token: token.into(),
        })
    }

    /// `{base}/api/{user}/tasks/{tail...}` with every segment percent-encoded
    pub fn endpoint(&self, tail: &[&str]) -> anyhow::Result<Url> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| anyhow!("server URL cannot be a base"))?;
            segments.pop_if_empty();
            segments.extend(["api", self.user.as_str(), "tasks"]);
            segments.extend(tail);
        }
        Ok(url)
    }

    pub async fn list(&self) -> anyhow::Result<Vec<Task>> {
        let req = self.http.get(self.endpoint(&[])?);
        Ok(self.send(req).await?.json().await?)
    }

    pub async fn create(&self, body: &Value) -> anyhow::Result<Task> {
        let req = self.http.post(self.endpoint(&[])?).json(body);
        Ok(self.send(req).await?.json().await?)
    }

    pub async fn get(&self, id: TaskId) -> anyhow::Result<Task> {
        let id = id.to_string();
        let req = self.http.get(self.endpoint(&[id.as_str()])?);
        Ok(self.send(req).await?.json().await?)
    }

    pub async fn update(&self, id: TaskId, body: &Value) -> anyhow::Result<Task> {
        let id = id.to_string();
        let req = self.http.put(self.endpoint(&[id.as_str()])?).json(body);
        Ok(self.send(req).await?.json().await?)
    }

    pub async fn delete(&self, id: TaskId) -> anyhow::Result<()> {
        let id = id.to_string();
        let req = self.http.delete(self.endpoint(&[id.as_str()])?);
        self.send(req).await?;
        Ok(())
    }

    pub async fn toggle_complete(&self, id: TaskId) -> anyhow::Result<Task> {
        let id = id.to_string();
        let req = self.http.patch(self.endpoint(&[id.as_str(), "complete"])?);
        Ok(self.send(req).await?.json().await?)
    }

    async fn send(&self, req: RequestBuilder) -> anyhow::Result<Response> {
        let res = req
            .bearer_auth(&self.token)
            .send()
            .await
            .context("request to the task API failed")?;

        if res.status().is_success() {
            return Ok(res);
        }

        let status = res.status();
        let detail = res
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| body.get("detail").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

        match status {
            StatusCode::UNAUTHORIZED => bail!("401 Unauthorized: {} (check --token or JWT_SECRET)", detail),
            _ => bail!("{}: {}", status, detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_encoded_endpoints() {
        let client = TaskClient::new("http://localhost:8000/", "user 1", "t").unwrap();
        assert_eq!(client.endpoint(&[]).unwrap().as_str(), "http://localhost:8000/api/user%201/tasks");
        assert_eq!(
            client.endpoint(&["7", "complete"]).unwrap().as_str(),
            "http://localhost:8000/api/user%201/tasks/7/complete"
        );
    }

    #[test]
    fn keeps_base_path_prefix() {
        let client = TaskClient::new("https://example.com/todo", "u1", "t").unwrap();
        assert_eq!(client.endpoint(&["3"]).unwrap().as_str(), "https://example.com/todo/api/u1/tasks/3");
    }

    #[test]
    fn rejects_non_base_urls() {
        assert!(TaskClient::new("mailto:someone@example.com", "u1", "t").is_err());
        assert!(TaskClient::new("not a url", "u1", "t").is_err());
    }
}
