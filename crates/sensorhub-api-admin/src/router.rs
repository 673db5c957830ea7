//! Admin API router configuration.
//!
//! Routes under `/api/admin` (token + admin claim required):
//! - GET /users - List accounts with device counts
//! - PUT /users/:id - Update account
//! - DELETE /users/:id - Delete account and its data
//! - GET /users/:id/profile - Account profile
//! - GET /users/:id/devices - Account devices
//! - GET /devices - List devices
//! - DELETE /devices/:id - Delete device
//! - GET /stats - Aggregate counts
//!
//! Routes under `/api/auth` (token required):
//! - GET /verify - Echo the verified caller

use crate::handlers::{
    delete_device_handler, delete_user_handler, list_devices_handler, list_users_handler,
    stats_handler, update_user_handler, user_devices_handler, user_profile_handler,
    verify_token_handler,
};
use crate::middleware::{admin_guard, firebase_auth_middleware};
use crate::services::AdminService;
use axum::{
    middleware,
    routing::{delete, get, put},
    Router,
};
use sensorhub_auth::TokenVerifier;
use std::sync::Arc;

/// Application state for the admin routes.
#[derive(Clone)]
pub struct AdminState {
    /// Admin operations.
    pub service: Arc<AdminService>,
    /// Verifier for caller ID tokens.
    pub verifier: Arc<dyn TokenVerifier>,
}

impl AdminState {
    /// Create a new admin state.
    pub fn new(service: AdminService, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self {
            service: Arc::new(service),
            verifier,
        }
    }
}

/// Create the admin router, to be nested under `/api/admin`.
///
/// Layers run outermost first: token verification, then the admin guard.
pub fn admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/users", get(list_users_handler))
        .route("/users/:id", put(update_user_handler))
        .route("/users/:id", delete(delete_user_handler))
        .route("/users/:id/profile", get(user_profile_handler))
        .route("/users/:id/devices", get(user_devices_handler))
        .route("/devices", get(list_devices_handler))
        .route("/devices/:id", delete(delete_device_handler))
        .route("/stats", get(stats_handler))
        .layer(middleware::from_fn(admin_guard))
        .layer(middleware::from_fn_with_state(
            state.verifier,
            firebase_auth_middleware,
        ))
        .layer(axum::Extension(state.service))
}

/// Create the token verification router, to be nested under `/api/auth`.
pub fn auth_router(verifier: Arc<dyn TokenVerifier>) -> Router {
    Router::new()
        .route("/verify", get(verify_token_handler))
        .layer(middleware::from_fn_with_state(
            verifier,
            firebase_auth_middleware,
        ))
}

/// Both routers at their public prefixes.
pub fn api_router(state: AdminState) -> Router {
    let verifier = state.verifier.clone();
    Router::new()
        .nest("/api/admin", admin_router(state))
        .nest("/api/auth", auth_router(verifier))
}
