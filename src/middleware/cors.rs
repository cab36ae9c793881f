//! CORS handling, kept apart from the auth gate and layered outside it.
//!
//! A preflight from an allow-listed origin is answered here with 204 and never reaches
//! the gate. Preflights from any other origin continue down the stack untouched.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

pub const ALLOW_METHODS: &str = "GET, POST, PUT, PATCH, DELETE, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";

#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allowed_origins: Vec<String>,
    max_age_secs: u64,
}

impl CorsPolicy {
    pub fn new(allowed_origins: Vec<String>, max_age_secs: u64) -> Self {
        Self {
            allowed_origins,
            max_age_secs,
        }
    }

    /// The request's `Origin` header, if it is on the allow-list.
    pub fn allowed_origin<'a>(&self, headers: &'a HeaderMap) -> Option<&'a HeaderValue> {
        let origin = headers.get(header::ORIGIN)?;
        let origin_str = origin.to_str().ok()?;
        self.allowed_origins
            .iter()
            .any(|allowed| allowed == origin_str)
            .then_some(origin)
    }

    /// Answer a preflight from an allow-listed origin. `None` means "not ours to answer".
    pub fn preflight(&self, method: &Method, headers: &HeaderMap) -> Option<Response> {
        if method != Method::OPTIONS {
            return None;
        }
        let origin = self.allowed_origin(headers)?.clone();

        let mut response = StatusCode::NO_CONTENT.into_response();
        let out = response.headers_mut();
        out.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        out.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        );
        out.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        );
        out.insert(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
        out.insert(
            header::ACCESS_CONTROL_MAX_AGE,
            HeaderValue::from(self.max_age_secs),
        );
        out.append(header::VARY, HeaderValue::from_static("Origin"));
        Some(response)
    }
}

pub async fn cors_middleware(
    State(cors): State<Arc<CorsPolicy>>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(response) = cors.preflight(request.method(), request.headers()) {
        tracing::debug!("Answered CORS preflight for {}", request.uri().path());
        return response;
    }

    let origin = cors.allowed_origin(request.headers()).cloned();
    let mut response = next.run(request).await;

    if let Some(origin) = origin {
        let out = response.headers_mut();
        out.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        out.insert(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
        out.append(header::VARY, HeaderValue::from_static("Origin"));
    }
    response
}
