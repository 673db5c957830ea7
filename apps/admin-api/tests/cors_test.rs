//! Integration tests for CORS handling.

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request},
};
use common::{call, test_app};

fn preflight(origin: &str) -> Request<Body> {
    Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/admin/users")
        .header(header::ORIGIN, origin)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_wildcard_allows_any_origin() {
    let response = call(test_app(&["*"]), preflight("https://anywhere.example")).await;

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_configured_origin_is_allowed() {
    let app = test_app(&["https://admin.example.com"]);
    let response = call(app, preflight("https://admin.example.com")).await;

    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "https://admin.example.com"
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_other_origin_is_not_allowed() {
    let app = test_app(&["https://admin.example.com"]);
    let response = call(app, preflight("https://evil.example")).await;

    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}
