mod common;

use axum::http::{StatusCode, header};
use common::spawn_app;

#[tokio::test]
async fn test_health_endpoints_are_public() {
    let app = spawn_app().await;

    let response = app.get("/api/health/live", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "alive");
    assert!(response.body["data"]["version"].is_string());

    let response = app.get("/api/health/ready", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["ready"], true);
    assert_eq!(response.body["data"]["checks"]["database"], true);
}

#[tokio::test]
async fn test_security_headers_and_request_id() {
    let app = spawn_app().await;

    let response = app.get("/api/health/live", None).await;

    assert_eq!(response.headers["x-content-type-options"], "nosniff");
    assert_eq!(response.headers["x-frame-options"], "DENY");
    assert!(response.headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_metrics_disabled_returns_not_found() {
    let app = spawn_app().await;

    let response = app.get("/api/metrics", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["success"], false);
}

#[tokio::test]
async fn test_unauthorized_responses_carry_challenge() {
    let app = spawn_app().await;

    let response = app.get("/api/users", None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers[header::WWW_AUTHENTICATE], "Bearer");
    assert_eq!(response.body["detail"], "Not authenticated");
}
