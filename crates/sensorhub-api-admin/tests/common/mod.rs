//! Common test utilities for sensorhub-api-admin integration tests.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use sensorhub_api_admin::{api_router, AdminService, AdminState};
use sensorhub_auth::test_keys::{sign_test_token, test_jwk, TEST_KID};
use sensorhub_auth::{FirebaseTokenVerifier, IdTokenClaims, TokenVerifier};
use sensorhub_store::{Account, CustomClaims, InMemoryDatabase, InMemoryIdentityProvider};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const PROJECT: &str = "sensorhub-test";

/// In-memory collaborators plus the service built on them.
pub struct TestBackend {
    pub identity: Arc<InMemoryIdentityProvider>,
    pub db: Arc<InMemoryDatabase>,
    pub service: AdminService,
}

impl TestBackend {
    pub fn new() -> Self {
        let identity = Arc::new(InMemoryIdentityProvider::new());
        let db = Arc::new(InMemoryDatabase::new());
        let service = AdminService::new(identity.clone(), db.clone(), db.clone(), db.clone());
        Self {
            identity,
            db,
            service,
        }
    }

    /// Router over these collaborators, verifying tokens with the test key.
    pub fn app(&self) -> Router {
        api_router(AdminState::new(self.service.clone(), test_verifier()))
    }
}

pub fn test_verifier() -> Arc<dyn TokenVerifier> {
    let key = test_jwk().to_decoding_key().expect("test key");
    Arc::new(FirebaseTokenVerifier::with_static_keys(
        PROJECT,
        [(TEST_KID.to_string(), key)],
    ))
}

/// Signed ID token for `uid` with the given admin flag.
pub fn token_for(uid: &str, admin: bool) -> String {
    let claims = IdTokenClaims::builder()
        .subject(uid)
        .project(PROJECT)
        .email(format!("{uid}@example.com"))
        .admin(admin)
        .expires_in_secs(3600)
        .build();
    sign_test_token(&claims, Some(TEST_KID))
}

pub fn admin_token() -> String {
    token_for("admin-uid", true)
}

pub fn account(uid: &str, email: &str, name: &str) -> Account {
    Account {
        uid: uid.to_string(),
        email: Some(email.to_string()),
        display_name: Some(name.to_string()),
        created_at: Some(1_700_000_000_000),
        ..Default::default()
    }
}

pub fn claims(value: Value) -> CustomClaims {
    match value {
        Value::Object(map) => map,
        _ => CustomClaims::new(),
    }
}

/// Two accounts, three devices, four records and one profile.
///
/// - `alice` owns `dev-a1` (registered 3000) and `dev-a2` (no timestamp)
/// - `bob` owns `dev-b1` (registered 5000)
/// - `ghost` owns `dev-g1` but has no account
pub async fn seed(backend: &TestBackend) {
    let mut alice = account("alice", "alice@example.com", "Alice");
    alice.custom_claims = claims(json!({ "tier": "gold" }));
    backend.identity.insert(alice).await;
    backend
        .identity
        .insert(account("bob", "bob@example.com", "Bob"))
        .await;

    let db = &backend.db;
    db.insert_device("dev-a1", json!({ "user_id": "alice", "registered_at": 3000, "secret": "x" }))
        .await;
    db.insert_device("dev-a2", json!({ "user_id": "alice" })).await;
    db.insert_device("dev-b1", json!({ "user_id": "bob", "registered_at": "5000" }))
        .await;
    db.insert_device("dev-g1", json!({ "user_id": "ghost", "registered_at": 1000 }))
        .await;

    db.insert_record("r1", json!({ "userId": "alice", "device_id": "dev-a1", "ts": 100 }))
        .await;
    db.insert_record("r2", json!({ "userId": "alice", "device_id": "dev-a1", "ts": 300 }))
        .await;
    db.insert_record("r3", json!({ "userId": "bob", "device_id": "dev-b1", "ts": 200 }))
        .await;
    db.insert_record("r4", json!({ "userId": "alice", "device_id": "dev-a2" }))
        .await;

    db.insert_profile("alice", json!({ "nickname": "al", "units": "metric" }))
        .await;
}

/// Send a request and decode the JSON response body (`Null` if empty).
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, Some(&admin_token()), None).await
}
