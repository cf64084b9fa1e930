//! Integration tests for the HTTP routes
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot` and reads
//! bodies with `http_body_util::BodyExt`.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use taskboard_core::{CredentialConfig, DataContext, DatabaseConfig};
use taskboard_server::{create_router, AppState};
use tower::ServiceExt;

fn credentials() -> CredentialConfig {
    let mut config = CredentialConfig::new("route-test-secret");
    config.hash_cost = 4;
    config
}

async fn create_app() -> Router {
    let context = DataContext::create_context(&DatabaseConfig::memory())
        .await
        .unwrap();
    create_router(AppState::new(context, &credentials()))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Test helper: register the default account and log in
async fn register_and_login(app: &Router) -> (i64, String) {
    let (status, account) = send(
        app,
        "POST",
        "/register",
        None,
        Some(json!({"name": "Test", "email": "t@t.com", "secret": "123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, login) = send(
        app,
        "POST",
        "/login",
        None,
        Some(json!({"email": "t@t.com", "secret": "123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    (
        account["id"].as_i64().unwrap(),
        login["token"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn test_health_and_status() {
    let app = create_app().await;

    let (status, body) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, "GET", "/api/status", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["backend"], "memory");
    assert_eq!(body["connected"], true);
}

#[tokio::test]
async fn test_register_hides_secret() {
    let app = create_app().await;
    let (status, account) = send(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({"name": "Test", "email": "t@t.com", "secret": "123"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(account["id"].is_i64());
    assert!(account.get("secret").is_none());
    assert_eq!(account["active"], true);
    assert_eq!(account["excluded"], false);
}

#[tokio::test]
async fn test_register_validation() {
    let app = create_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({"name": "Test", "email": "not-an-email", "secret": "123"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = send(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({"email": "t@t.com", "secret": "123"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({"name": "Test", "email": "a@b..c", "secret": "123"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_login_failures_share_one_response() {
    let app = create_app().await;
    register_and_login(&app).await;

    let (wrong_status, wrong) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({"email": "t@t.com", "secret": "wrong"})),
    )
    .await;
    let (unknown_status, unknown) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({"email": "nobody@t.com", "secret": "123"})),
    )
    .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong, unknown);
    assert_eq!(wrong["message"], "Invalid e-mail or password");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = create_app().await;

    let (status, body) = send(&app, "GET", "/tasks/1", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = send(&app, "GET", "/tasks/1", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_task_lifecycle() {
    let app = create_app().await;
    let (account_id, token) = register_and_login(&app).await;
    let token = Some(token.as_str());

    let (status, task) = send(
        &app,
        "POST",
        "/tasks",
        token,
        Some(json!({"title": "X", "description": "Y"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["parentAccountId"], account_id);
    let task_id = task["id"].as_i64().unwrap();

    let (status, tasks) = send(
        &app,
        "GET",
        &format!("/accounts/{}/tasks", account_id),
        token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tasks.as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/tasks/{}", task_id),
        token,
        Some(json!({"done": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["affected"], 1);

    let (_, found) = send(&app, "GET", &format!("/tasks/{}", task_id), token, None).await;
    assert_eq!(found[0]["done"], true);

    let (status, body) = send(&app, "DELETE", &format!("/tasks/{}", task_id), token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["affected"], 1);

    let (_, found) = send(&app, "GET", &format!("/tasks/{}", task_id), token, None).await;
    assert_eq!(found, json!([]));
}

#[tokio::test]
async fn test_task_validation() {
    let app = create_app().await;
    let (_, token) = register_and_login(&app).await;
    let token = Some(token.as_str());

    let (status, body) = send(
        &app,
        "POST",
        "/tasks",
        token,
        Some(json!({"title": "x".repeat(33), "description": "Y"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = send(&app, "PATCH", "/tasks/1", token, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_numeric_id_is_a_validation_error() {
    let app = create_app().await;
    let (_, token) = register_and_login(&app).await;
    let token = Some(token.as_str());

    for (method, uri) in [
        ("GET", "/tasks/abc"),
        ("DELETE", "/tasks/abc"),
        ("GET", "/accounts/abc/tasks"),
        ("DELETE", "/items/abc"),
        ("GET", "/tasks/abc/items"),
    ] {
        let (status, body) = send(&app, method, uri, token, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} {}", method, uri);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["message"].is_string());
    }
}

#[tokio::test]
async fn test_item_soft_delete() {
    let app = create_app().await;
    let (_, token) = register_and_login(&app).await;
    let token = Some(token.as_str());

    let (_, task) = send(&app, "POST", "/tasks", token, Some(json!({"description": "Y"}))).await;
    let task_id = task["id"].as_i64().unwrap();

    for _ in 0..2 {
        let (status, item) = send(
            &app,
            "POST",
            "/items",
            token,
            Some(json!({"parentTaskId": task_id})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(item["description"], "New item");
        assert_eq!(item["done"], false);
    }

    let (status, body) = send(
        &app,
        "PUT",
        "/items/1",
        token,
        Some(json!({"description": "new", "done": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["affected"], 1);

    let (status, body) = send(&app, "DELETE", "/items/1", token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["affected"], 1);

    let (_, items) = send(&app, "GET", &format!("/tasks/{}/items", task_id), token, None).await;
    let items = items.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["description"], "new");
    assert_eq!(items[0]["done"], true);
    assert_eq!(items[0]["excluded"], true);
    assert_eq!(items[1]["excluded"], false);
}

#[tokio::test]
async fn test_libsql_backend_serves_requests() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let config = DatabaseConfig::libsql(temp_dir.path().join("routes.db"));
    let context = DataContext::create_context(&config).await.unwrap();
    let app = create_router(AppState::new(context, &credentials()));

    let (status, body) = send(&app, "GET", "/api/status", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["backend"], "libsql");

    let (_, token) = register_and_login(&app).await;
    let (status, task) = send(
        &app,
        "POST",
        "/tasks",
        Some(token.as_str()),
        Some(json!({"description": "persisted"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["title"], "New task");
}
