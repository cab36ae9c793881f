mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use bizdesk_api::auth::Role;
use common::*;

fn preflight(uri: &str, origin: &str) -> Request<Body> {
    Request::builder()
        .method(Method::OPTIONS)
        .uri(uri)
        .header(header::ORIGIN, origin)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_preflight_skips_the_gate() {
    let app = TestApp::new();

    // Protected prefix, no credential: the preflight still succeeds.
    let response = app.send(preflight("/api/admin/users", ALLOWED_ORIGIN)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        ALLOWED_ORIGIN
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
    assert!(headers.contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
    assert!(headers.contains_key(header::ACCESS_CONTROL_ALLOW_HEADERS));
}

#[tokio::test]
async fn test_preflight_from_unknown_origin_is_gated() {
    let app = TestApp::new();

    let response = app
        .send(preflight("/api/admin/users", "https://evil.example"))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(!response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn test_cors_headers_on_gated_responses() {
    let app = TestApp::new();

    let request = Request::builder()
        .uri("/api/auth/whoami")
        .header(header::ORIGIN, ALLOWED_ORIGIN)
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        ALLOWED_ORIGIN
    );

    let request = Request::builder()
        .uri("/api/auth/whoami")
        .header(header::ORIGIN, ALLOWED_ORIGIN)
        .header(header::COOKIE, format!("token={}", app.token(Role::Admin)))
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}
