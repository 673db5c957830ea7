//! Device endpoint handlers.

use crate::error::AdminApiError;
use crate::models::{DeviceListResponse, StatusResponse};
use crate::services::AdminService;
use axum::{extract::Path, Extension, Json};
use sensorhub_auth::IdTokenClaims;
use std::sync::Arc;

/// Lists all devices with owner and last activity.
#[utoipa::path(
    get,
    path = "/api/admin/devices",
    responses(
        (status = 200, description = "All devices, newest registration first", body = DeviceListResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an administrator"),
        (status = 500, description = "Database failure"),
    ),
    security(("bearerAuth" = [])),
    tag = "Devices"
)]
pub async fn list_devices_handler(
    Extension(service): Extension<Arc<AdminService>>,
) -> Result<Json<DeviceListResponse>, AdminApiError> {
    Ok(Json(service.list_devices().await?))
}

/// Deletes a device. Its records are retained.
#[utoipa::path(
    delete,
    path = "/api/admin/devices/{id}",
    params(("id" = String, Path, description = "Device id")),
    responses(
        (status = 200, description = "Device deleted", body = StatusResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an administrator"),
        (status = 500, description = "Database failure"),
    ),
    security(("bearerAuth" = [])),
    tag = "Devices"
)]
pub async fn delete_device_handler(
    Extension(claims): Extension<IdTokenClaims>,
    Extension(service): Extension<Arc<AdminService>>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, AdminApiError> {
    tracing::info!(admin_uid = %claims.sub, device_id = %id, "Deleting device");

    service.delete_device(&id).await?;

    Ok(Json(StatusResponse::ok("Device deleted successfully")))
}
