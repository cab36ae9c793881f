#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use bizdesk_api::{
    auth::{password::hash_password, Role},
    create_app,
    database::{MemoryUserStore, NewUser, User},
    AppConfig, AppState,
};
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;

pub const ALLOWED_ORIGIN: &str = "http://localhost:5173";
pub const TEST_COST: u32 = 4;

pub fn test_config() -> AppConfig {
    AppConfig::from_lookup(|name| match name {
        "JWT_SECRET_KEY" => Some("integration-test-secret".to_string()),
        "CORS_ORIGINS" => Some(ALLOWED_ORIGIN.to_string()),
        _ => None,
    })
    .expect("test config")
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        let state = AppState::new(&test_config(), Arc::new(MemoryUserStore::new()))
            .expect("test state")
            .with_password_cost(TEST_COST);
        Self {
            router: create_app(state.clone()),
            state,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    /// A token for `role` that is valid right now.
    pub fn token(&self, role: Role) -> String {
        self.token_for("1", role)
    }

    /// A token for a specific subject, e.g. a user created in the test.
    pub fn token_for(&self, subject: &str, role: Role) -> String {
        self.state
            .keys
            .issue(subject, role, Utc::now().timestamp())
            .expect("issue token")
            .token
    }

    /// A correctly signed token that expired a while ago.
    pub fn expired_token(&self, role: Role) -> String {
        let ttl = self.state.keys.ttl().num_seconds();
        self.state
            .keys
            .issue("1", role, Utc::now().timestamp() - ttl - 60)
            .expect("issue token")
            .token
    }

    pub async fn add_user(&self, email: &str, password: &str, role: Role) -> User {
        self.state
            .users
            .insert(NewUser {
                name: "Test User".to_string(),
                email: email.to_string(),
                password_hash: hash_password(password, TEST_COST).expect("hash"),
                role,
            })
            .await
            .expect("insert user")
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

pub fn get_with_cookie(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, format!("token={}", token))
        .body(Body::empty())
        .expect("request")
}

pub fn get_with_bearer(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .expect("request")
}

pub fn post_json(uri: &str, body: &Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("token={}", token));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request")
}

/// Any method, optional JSON body, optional session cookie.
pub fn request(method: &str, uri: &str, body: Option<&Value>, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("token={}", token));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).expect("request")
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

pub fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

pub fn assert_redirect(response: &Response, to: &str) {
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(response), Some(to));
}
