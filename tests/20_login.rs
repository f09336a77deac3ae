mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn login_with_correct_password_returns_token() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    server.register("test@example.com", "테스트 사용자").await?;

    let res = server
        .client
        .post(server.url("/login"))
        .json(&json!({ "email": "test@example.com", "password": "password123" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Login successful");
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert_eq!(body["user"]["email"], "test@example.com");
    assert_eq!(body["user"]["name"], "테스트 사용자");
    assert!(body["user"]["id"].is_i64());
    Ok(())
}

#[tokio::test]
async fn wrong_password_and_unknown_user_look_identical() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    server.register("test@example.com", "테스트 사용자").await?;

    let wrong = server
        .client
        .post(server.url("/login"))
        .json(&json!({ "email": "test@example.com", "password": "wrongpassword" }))
        .send()
        .await?;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    let wrong: Value = wrong.json().await?;

    let unknown = server
        .client
        .post(server.url("/login"))
        .json(&json!({ "email": "nonexistent@example.com", "password": "password123" }))
        .send()
        .await?;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    let unknown: Value = unknown.json().await?;

    assert_eq!(wrong, unknown);
    assert!(wrong["error"].as_str().unwrap().contains("email or password"));
    Ok(())
}

#[tokio::test]
async fn invalid_email_shape_is_400() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let res = server
        .client
        .post(server.url("/login"))
        .json(&json!({ "email": "invalid-email", "password": "password123" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await?;
    assert!(body["error"].as_str().unwrap().contains("email"));
    assert_eq!(server.store.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn short_password_is_400() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let res = server
        .client
        .post(server.url("/login"))
        .json(&json!({ "email": "test@example.com", "password": "123" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await?;
    assert!(body["error"].as_str().unwrap().contains("at least 6 characters"));
    assert_eq!(server.store.calls(), 0);
    Ok(())
}
