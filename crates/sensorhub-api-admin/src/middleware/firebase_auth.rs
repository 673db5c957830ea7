//! ID token authentication middleware.
//!
//! Extracts the bearer token from the Authorization header, verifies it, and
//! inserts the decoded `IdTokenClaims` into request extensions.

use crate::error::AdminApiError;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use sensorhub_auth::TokenVerifier;
use std::sync::Arc;

/// Extract a non-empty bearer token from `headers`.
///
/// # Errors
///
/// Returns `AdminApiError::Unauthorized` if the header is missing, not a
/// bearer credential, or empty.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AdminApiError> {
    let invalid = || AdminApiError::Unauthorized("Missing or invalid authorization header".into());

    let token = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or_else(invalid)?;

    if token.is_empty() {
        tracing::warn!("Rejected empty bearer token");
        return Err(invalid());
    }
    Ok(token)
}

/// Token authentication middleware.
///
/// # Usage
///
/// ```rust,ignore
/// use axum::{Router, routing::get, middleware};
/// use sensorhub_api_admin::middleware::firebase_auth_middleware;
///
/// let router = Router::new()
///     .route("/stats", get(stats))
///     .layer(middleware::from_fn_with_state(verifier, firebase_auth_middleware));
/// ```
pub async fn firebase_auth_middleware(
    State(verifier): State<Arc<dyn TokenVerifier>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AdminApiError> {
    let token = bearer_token(request.headers())?;

    let claims = verifier.verify(token).await.map_err(|e| {
        if e.is_token_error() {
            tracing::warn!(error = %e, "Token verification failed");
        } else {
            tracing::error!(error = %e, "Token verification could not complete");
        }
        AdminApiError::Unauthorized(format!("Invalid token: {e}"))
    })?;

    tracing::debug!(uid = %claims.uid(), "Caller authenticated");
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}
