//! Shared helpers for server integration tests.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, Response},
    Router,
};
use sensorhub_admin_api::app::build_app;
use sensorhub_api_admin::{AdminService, AdminState};
use sensorhub_auth::test_keys::{test_jwk, TEST_KID};
use sensorhub_auth::FirebaseTokenVerifier;
use sensorhub_store::{InMemoryDatabase, InMemoryIdentityProvider};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const PROJECT: &str = "sensorhub-test";

/// Full application over empty in-memory collaborators.
pub fn test_app(cors_origins: &[&str]) -> Router {
    let identity = Arc::new(InMemoryIdentityProvider::new());
    let db = Arc::new(InMemoryDatabase::new());
    let service = AdminService::new(identity, db.clone(), db.clone(), db);

    let key = test_jwk().to_decoding_key().expect("test key");
    let verifier = Arc::new(FirebaseTokenVerifier::with_static_keys(
        PROJECT,
        [(TEST_KID.to_string(), key)],
    ));

    let origins: Vec<String> = cors_origins.iter().map(|o| (*o).to_string()).collect();
    build_app(AdminState::new(service, verifier), &origins)
}

pub async fn call(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
