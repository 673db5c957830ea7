//! Integration tests for the health endpoint.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{call, json_body, test_app};

#[tokio::test]
async fn test_health_returns_status_and_version() {
    let response = call(
        test_app(&["*"]),
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_health_needs_no_token() {
    let response = call(
        test_app(&["*"]),
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_api_routes_are_mounted() {
    let response = call(
        test_app(&["*"]),
        Request::builder()
            .uri("/api/admin/stats")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let response = call(
        test_app(&["*"]),
        Request::builder().uri("/nope").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
