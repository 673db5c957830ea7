//! Wiring of collaborators, routes and HTTP layers.

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::get,
    Json, Router,
};
use sensorhub_api_admin::{api_router, AdminApiDoc, AdminService, AdminState};
use sensorhub_auth::{AuthError, FirebaseTokenVerifier, ServiceAccountKey, TokenVerifier};
use sensorhub_store::{
    AccessTokenProvider, IdentityToolkitClient, RealtimeDatabaseClient, ServiceAccountTokenCache,
    StaticAccessToken, StoreError,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use utoipa::OpenApi;

use crate::config::{Config, Credentials};

/// Failures while constructing the collaborators at startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Authentication setup failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Failed to create backend client: {0}")]
    Backend(#[from] StoreError),
}

/// Build the admin state from configuration.
///
/// # Errors
///
/// Returns `StartupError` if the service-account key cannot be read or an
/// HTTP client cannot be created.
pub fn build_state(config: &Config) -> Result<AdminState, StartupError> {
    let tokens: Arc<dyn AccessTokenProvider> = match &config.credentials {
        Credentials::StaticToken(token) => {
            info!("Using static access token");
            Arc::new(StaticAccessToken::new(token.clone()))
        }
        Credentials::ServiceAccountFile(path) => {
            let key = ServiceAccountKey::from_file(path)?;
            info!(client_email = %key.client_email, "Using service account credentials");
            Arc::new(ServiceAccountTokenCache::new(key)?)
        }
    };

    let identity = Arc::new(IdentityToolkitClient::new(
        &config.identity_toolkit_url,
        &config.project_id,
        tokens.clone(),
    )?);
    let database = Arc::new(RealtimeDatabaseClient::new(&config.database_url, tokens)?);
    let service = AdminService::new(identity, database.clone(), database.clone(), database);

    let verifier: Arc<dyn TokenVerifier> = Arc::new(FirebaseTokenVerifier::from_jwks_url(
        &config.project_id,
        &config.jwks_url,
    )?);

    Ok(AdminState::new(service, verifier))
}

/// Liveness response with the crate version.
async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(AdminApiDoc::openapi())
}

/// The complete application: API routes, health, `OpenAPI` JSON and the
/// request id, tracing and CORS layers.
pub fn build_app(state: AdminState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api-doc/openapi.json", get(openapi_handler))
        .merge(api_router(state))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(build_cors_layer(cors_origins))
}

/// Build the CORS layer from configured origins.
///
/// Explicit origin lists allow credentials; `*` allows any origin without
/// credentials.
pub fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let is_wildcard = origins.iter().any(|o| o == "*");

    if is_wildcard {
        return CorsLayer::new()
            .allow_origin(AllowOrigin::any())
            .allow_methods(Any)
            .allow_headers(Any)
            .max_age(Duration::from_secs(3600));
    }

    let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _req: &axum::http::request::Parts| {
                let is_allowed = allowed.contains(origin);
                if !is_allowed {
                    tracing::warn!(
                        target: "security",
                        origin = %origin.to_str().unwrap_or("<non-utf8>"),
                        "CORS origin rejected"
                    );
                }
                is_allowed
            },
        ))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static("x-request-id"),
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
