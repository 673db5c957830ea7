//! GET /stats - aggregate counts.

use crate::error::AdminApiError;
use crate::models::StatsResponse;
use crate::services::AdminService;
use axum::{Extension, Json};
use std::sync::Arc;

/// Returns account, device and record counts.
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Counts snapshot", body = StatsResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an administrator"),
        (status = 500, description = "Identity service or database failure"),
    ),
    security(("bearerAuth" = [])),
    tag = "Stats"
)]
pub async fn stats_handler(
    Extension(service): Extension<Arc<AdminService>>,
) -> Result<Json<StatsResponse>, AdminApiError> {
    Ok(Json(service.stats().await?))
}
