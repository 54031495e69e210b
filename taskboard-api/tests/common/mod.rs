//! Common test utilities for API tests
//!
//! The router runs over the in-memory store, so these tests need no
//! database. Requests go through the full middleware stack via
//! `tower::Service::call`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig, LogFormat};
use taskboard_shared::auth::password::PasswordPolicy;
use taskboard_shared::store::InMemoryStore;
use tower::Service as _;

pub const TEST_SECRET: &str = "api-test-secret-that-is-long-enough-1234";

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            url: "postgresql://unused".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            ttl_minutes: 60,
        },
        log_format: LogFormat::Pretty,
    }
}

/// Test context with a fresh router and store
pub struct TestContext {
    pub app: axum::Router,
    pub state: AppState,
}

/// A registered account and its token
pub struct Session {
    pub id: String,
    pub token: String,
    pub user: Value,
}

impl TestContext {
    pub fn new() -> Self {
        let policy = PasswordPolicy {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        };
        let state = AppState::with_policy(Arc::new(InMemoryStore::new()), test_config(), policy);
        let app = build_router(state.clone());
        Self { app, state }
    }

    /// Sends a request and returns the status and decoded JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, Some(token), None).await
    }

    /// Registers `username` with `role` and returns the session
    pub async fn register(&self, username: &str, role: &str) -> Session {
        let (status, body) = self
            .send(
                Method::POST,
                "/auth/register",
                None,
                Some(json!({
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": format!("{}-password", username),
                    "role": role,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "registration failed: {}", body);

        Session {
            id: body["user"]["id"].as_str().unwrap().to_string(),
            token: body["token"].as_str().unwrap().to_string(),
            user: body["user"].clone(),
        }
    }

    /// Creates a project as `manager` and adds `members`
    pub async fn project_with(&self, manager: &Session, members: &[&Session]) -> String {
        let (status, project) = self
            .post("/projects", &manager.token, json!({ "name": "Apollo" }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "project creation failed: {}", project);
        let project_id = project["id"].as_str().unwrap().to_string();

        for member in members {
            let (status, body) = self
                .post(
                    &format!("/projects/{}/members", project_id),
                    &manager.token,
                    json!({ "user_id": member.id }),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED, "adding member failed: {}", body);
        }

        project_id
    }
}

/// Asserts the uniform error envelope and returns its kind
pub fn error_kind(body: &Value) -> &str {
    assert!(body["error"]["message"].is_string(), "not an error envelope: {}", body);
    body["error"]["kind"].as_str().unwrap()
}
