//! Admin claim guard middleware.
//!
//! Checks that the authenticated caller carries `admin: true` before allowing
//! access to admin endpoints.

use crate::error::AdminApiError;
use axum::{body::Body, extract::Request, middleware::Next, response::Response};
use sensorhub_auth::IdTokenClaims;

/// Middleware that requires the `admin` custom claim.
///
/// Requires `firebase_auth_middleware` to have inserted `IdTokenClaims` into
/// the request extensions.
///
/// # Errors
///
/// - `AdminApiError::Unauthorized` (401): no claims in request extensions
/// - `AdminApiError::Forbidden` (403): the caller is not an administrator
pub async fn admin_guard(request: Request<Body>, next: Next) -> Result<Response, AdminApiError> {
    let claims = request
        .extensions()
        .get::<IdTokenClaims>()
        .ok_or_else(|| AdminApiError::Unauthorized("Authentication required".into()))?;

    if !claims.is_admin() {
        tracing::warn!(
            uid = %claims.sub,
            admin_claim = ?claims.claim("admin"),
            "Access denied: admin claim required"
        );
        return Err(AdminApiError::Forbidden("Admin access required".into()));
    }

    tracing::debug!(uid = %claims.sub, "Admin access granted");

    Ok(next.run(request).await)
}
