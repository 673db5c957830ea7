//! Account endpoint handlers.
//!
//! - GET /users - List accounts with device counts
//! - PUT /users/:id - Update account fields and the admin claim
//! - DELETE /users/:id - Delete an account and its data
//! - GET /users/:id/profile - Fetch the stored profile
//! - GET /users/:id/devices - List the account's devices

use crate::error::AdminApiError;
use crate::models::{
    ListUsersQuery, ProfileResponse, StatusResponse, UpdateUserRequest, UserDeviceListResponse,
    UserListResponse,
};
use crate::services::AdminService;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query,
    },
    Extension, Json,
};
use sensorhub_auth::IdTokenClaims;
use std::sync::Arc;

/// Lists one page of accounts.
#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "One page of users", body = UserListResponse),
        (status = 400, description = "Malformed query string"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an administrator"),
        (status = 500, description = "Identity service or database failure"),
    ),
    security(("bearerAuth" = [])),
    tag = "Users"
)]
pub async fn list_users_handler(
    Extension(claims): Extension<IdTokenClaims>,
    Extension(service): Extension<Arc<AdminService>>,
    query: Result<Query<ListUsersQuery>, QueryRejection>,
) -> Result<Json<UserListResponse>, AdminApiError> {
    let Query(query) = query.map_err(|e| AdminApiError::InvalidRequest(e.body_text()))?;

    tracing::info!(
        admin_uid = %claims.sub,
        limit = query.limit(),
        has_page_token = query.page_token().is_some(),
        "Listing users"
    );

    Ok(Json(service.list_users(&query).await?))
}

/// Updates an account.
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}",
    params(("id" = String, Path, description = "Account uid")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = StatusResponse),
        (status = 400, description = "Body is not valid JSON"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an administrator"),
        (status = 500, description = "Identity service failure"),
    ),
    security(("bearerAuth" = [])),
    tag = "Users"
)]
pub async fn update_user_handler(
    Extension(claims): Extension<IdTokenClaims>,
    Extension(service): Extension<Arc<AdminService>>,
    Path(id): Path<String>,
    body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, AdminApiError> {
    let Json(request) = body.map_err(|e| AdminApiError::InvalidRequest(e.body_text()))?;

    tracing::info!(
        admin_uid = %claims.sub,
        uid = %id,
        email = request.email.is_some(),
        display_name = request.display_name.is_some(),
        disabled = ?request.disabled,
        admin = ?request.admin,
        "Updating user"
    );

    service.update_user(&id, &request).await?;

    Ok(Json(StatusResponse::ok("User updated successfully")))
}

/// Deletes an account with its devices, records and profile.
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(("id" = String, Path, description = "Account uid")),
    responses(
        (status = 200, description = "User and data deleted", body = StatusResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an administrator"),
        (status = 500, description = "A deletion step failed; the message names it"),
    ),
    security(("bearerAuth" = [])),
    tag = "Users"
)]
pub async fn delete_user_handler(
    Extension(claims): Extension<IdTokenClaims>,
    Extension(service): Extension<Arc<AdminService>>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, AdminApiError> {
    tracing::info!(admin_uid = %claims.sub, uid = %id, "Deleting user");

    service.delete_user(&id).await?;

    Ok(Json(StatusResponse::ok(
        "User and associated data deleted successfully",
    )))
}

/// Fetches an account's stored profile.
#[utoipa::path(
    get,
    path = "/api/admin/users/{id}/profile",
    params(("id" = String, Path, description = "Account uid")),
    responses(
        (status = 200, description = "Stored profile", body = ProfileResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "No profile stored"),
        (status = 500, description = "Database failure"),
    ),
    security(("bearerAuth" = [])),
    tag = "Users"
)]
pub async fn user_profile_handler(
    Extension(service): Extension<Arc<AdminService>>,
    Path(id): Path<String>,
) -> Result<Json<ProfileResponse>, AdminApiError> {
    Ok(Json(service.get_profile(&id).await?))
}

/// Lists the devices an account owns.
#[utoipa::path(
    get,
    path = "/api/admin/users/{id}/devices",
    params(("id" = String, Path, description = "Account uid")),
    responses(
        (status = 200, description = "Devices owned by the account", body = UserDeviceListResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an administrator"),
        (status = 500, description = "Database failure"),
    ),
    security(("bearerAuth" = [])),
    tag = "Users"
)]
pub async fn user_devices_handler(
    Extension(service): Extension<Arc<AdminService>>,
    Path(id): Path<String>,
) -> Result<Json<UserDeviceListResponse>, AdminApiError> {
    Ok(Json(service.user_devices(&id).await?))
}
