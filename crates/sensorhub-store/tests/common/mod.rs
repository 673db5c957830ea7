//! Common test utilities for sensorhub-store integration tests.

#![allow(dead_code)]

use sensorhub_store::StaticAccessToken;
use serde_json::{json, Value};
use std::sync::Arc;

pub const PROJECT: &str = "demo-project";
pub const TOKEN: &str = "test-access-token";

pub fn static_token() -> Arc<StaticAccessToken> {
    Arc::new(StaticAccessToken::new(TOKEN))
}

/// Identity Toolkit path for an account action.
pub fn accounts_path(action: &str) -> String {
    format!("/v1/projects/{PROJECT}/accounts:{action}")
}

/// Test data factory for identity service accounts.
pub fn create_test_user(uid: &str, email_prefix: &str) -> Value {
    json!({
        "localId": uid,
        "email": format!("{email_prefix}@example.com"),
        "displayName": format!("Test User {email_prefix}"),
        "emailVerified": true,
        "disabled": false,
        "createdAt": "1700000000000",
        "lastLoginAt": "1700000100000"
    })
}

/// Identity service error envelope.
pub fn create_api_error(code: u16, message: &str) -> Value {
    json!({
        "error": { "code": code, "message": message, "errors": [] }
    })
}
