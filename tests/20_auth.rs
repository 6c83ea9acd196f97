mod common;

use anyhow::Result;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::{header, StatusCode};
use serde_json::{json, Value};

fn sign(header: Header, claims: Value, secret: &str) -> String {
    encode(&header, &claims, &EncodingKey::from_secret(secret.as_bytes())).expect("sign token")
}

async fn detail(res: reqwest::Response) -> Result<String> {
    let body = res.json::<Value>().await?;
    Ok(body["detail"].as_str().unwrap_or_default().to_string())
}

#[tokio::test]
async fn missing_header_is_unauthorized() -> Result<()> {
    let app = common::spawn_app().await?;

    let res = app.client.get(app.tasks_url("u1")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        res.headers().get(header::WWW_AUTHENTICATE).and_then(|v| v.to_str().ok()),
        Some("Bearer")
    );
    assert!(!detail(res).await?.is_empty());
    assert_eq!(app.store.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn non_bearer_scheme_is_unauthorized() -> Result<()> {
    let app = common::spawn_app().await?;

    let res = app
        .client
        .get(app.tasks_url("u1"))
        .header(header::AUTHORIZATION, "Basic dTE6cGFzcw==")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn bad_tokens_are_unauthorized() -> Result<()> {
    let app = common::spawn_app().await?;
    let future = Utc::now().timestamp() + 600;
    let past = Utc::now().timestamp() - 600;

    let cases = [
        ("garbage", "not.a.jwt".to_string()),
        ("wrong secret", sign(Header::default(), json!({ "sub": "u1", "exp": future }), "other")),
        ("expired", sign(Header::default(), json!({ "sub": "u1", "exp": past }), common::SECRET)),
        (
            "wrong algorithm",
            sign(Header::new(Algorithm::HS384), json!({ "sub": "u1", "exp": future }), common::SECRET),
        ),
        ("missing subject", sign(Header::default(), json!({ "exp": future }), common::SECRET)),
    ];

    for (name, token) in cases {
        let res = app.client.get(app.tasks_url("u1")).bearer_auth(&token).send().await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "case '{}'", name);
    }
    assert_eq!(app.store.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn invalid_token_on_foreign_path_is_unauthorized_not_forbidden() -> Result<()> {
    let app = common::spawn_app().await?;

    let res = app.client.get(app.tasks_url("u2")).bearer_auth("not.a.jwt").send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn subject_mismatch_is_forbidden_before_any_lookup() -> Result<()> {
    let app = common::spawn_app().await?;
    let task = app.create_task("u1", json!({ "title": "private" })).await?;
    let id = task["id"].as_i64().expect("id");
    let calls_before = app.store.calls();

    let token = app.token("u2");
    let requests = vec![
        app.client.get(app.tasks_url("u1")),
        app.client.post(app.tasks_url("u1")).json(&json!({ "title": "sneaky" })),
        app.client.get(app.task_url("u1", id)),
        app.client.get(app.task_url("u1", 987_654)),
        app.client.put(app.task_url("u1", id)).json(&json!({ "title": "hijacked" })),
        app.client.delete(app.task_url("u1", id)),
        app.client.patch(format!("{}/complete", app.task_url("u1", id))),
        app.client.patch(format!("{}/complete", app.task_url("u1", "not-a-number"))),
    ];

    for req in requests {
        let res = req.bearer_auth(&token).send().await?;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert!(!detail(res).await?.is_empty());
    }

    // The guard refused every request before the store was consulted
    assert_eq!(app.store.calls(), calls_before);
    Ok(())
}

#[tokio::test]
async fn forbidden_wins_over_invalid_body() -> Result<()> {
    let app = common::spawn_app().await?;

    let res = app
        .client
        .post(app.tasks_url("u1"))
        .bearer_auth(app.token("u2"))
        .json(&json!({ "title": "", "bogus": 1 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn owner_comparison_is_case_sensitive() -> Result<()> {
    let app = common::spawn_app().await?;

    let res = app.client.get(app.tasks_url("U1")).bearer_auth(app.token("u1")).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn leeway_is_configurable() -> Result<()> {
    let app = common::spawn_app_with(|key| (key == "SECURITY_JWT_LEEWAY_SECS").then(|| "300".to_string())).await?;
    let recently_expired = Utc::now().timestamp() - 30;
    let token = sign(Header::default(), json!({ "sub": "u1", "exp": recently_expired }), common::SECRET);

    let res = app.client.get(app.tasks_url("u1")).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn bearer_scheme_is_case_insensitive() -> Result<()> {
    let app = common::spawn_app().await?;
    let token = app.token("u1");

    for scheme in ["bearer", "BEARER", "Bearer"] {
        let res = app
            .client
            .get(app.tasks_url("u1"))
            .header(header::AUTHORIZATION, format!("{} {}", scheme, token))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK, "scheme '{}'", scheme);
    }
    Ok(())
}
