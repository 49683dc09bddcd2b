//! Shared harness for the HTTP integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use songbook::api::AppState;
use songbook::config::Config;
use tower::ServiceExt;

pub const PASSWORD: &str = "Secret123";

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub config: Config,
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.database.url = format!(
        "sqlite:{}",
        std::env::temp_dir().join("songbook-tests").display()
    );
    config.database.name = uuid::Uuid::new_v4().to_string();
    config.observability.metrics_enabled = false;
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_config()).await
}

pub async fn spawn_app_with(config: Config) -> TestApp {
    let state = songbook::api::create_app_state_from_config(config.clone(), None)
        .await
        .expect("Failed to create app state");

    TestApp {
        router: songbook::api::router(state.clone()),
        state,
        config,
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(request("GET", uri, token, None)).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(request("POST", uri, token, Some(body))).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(request("PUT", uri, token, Some(body))).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(request("DELETE", uri, token, None)).await
    }

    pub async fn register(&self, username: &str) -> TestResponse {
        self.post(
            "/api/auth/register",
            None,
            json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password": PASSWORD,
            }),
        )
        .await
    }

    /// Returns `(access_token, refresh_token)`.
    pub async fn login(&self, username: &str) -> (String, String) {
        let response = self
            .post(
                "/api/auth/login",
                None,
                json!({ "username": username, "password": PASSWORD }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);

        (
            response.body["data"]["access_token"]
                .as_str()
                .unwrap()
                .to_string(),
            response.body["data"]["refresh_token"]
                .as_str()
                .unwrap()
                .to_string(),
        )
    }

    /// Registers and logs in, returning the access token.
    pub async fn signup(&self, username: &str) -> String {
        let response = self.register(username).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        self.login(username).await.0
    }

    pub async fn create_song(&self, token: &str, song: Value) -> i64 {
        let response = self.post("/api/songs", Some(token), song).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["data"]["id"].as_i64().unwrap()
    }
}

pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}
