//! GET /api/auth/verify - echo the verified caller.

use crate::error::AdminApiError;
use crate::models::VerifyResponse;
use axum::{Extension, Json};
use sensorhub_auth::IdTokenClaims;

/// Verifies the caller's token. Admin rights are not required.
#[utoipa::path(
    get,
    path = "/api/auth/verify",
    responses(
        (status = 200, description = "Token is valid", body = VerifyResponse),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearerAuth" = [])),
    tag = "Auth"
)]
pub async fn verify_token_handler(
    Extension(claims): Extension<IdTokenClaims>,
) -> Result<Json<VerifyResponse>, AdminApiError> {
    Ok(Json(VerifyResponse {
        uid: claims.sub,
        email: claims.email,
        verified: true,
    }))
}
