//! `OpenAPI` document for the admin API.

use crate::handlers;
use crate::models::{
    DeviceListResponse, DeviceResponse, ProfileResponse, StatsResponse, StatusResponse,
    UpdateUserRequest, UserDeviceListResponse, UserDeviceResponse, UserListResponse,
    UserResponse, VerifyResponse,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Security scheme modifier for bearer ID tokens.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearerAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// `OpenAPI` documentation for the admin API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "SensorHub Admin API",
        description = "Administration of accounts, devices and telemetry statistics"
    ),
    paths(
        handlers::list_users_handler,
        handlers::update_user_handler,
        handlers::delete_user_handler,
        handlers::user_profile_handler,
        handlers::user_devices_handler,
        handlers::list_devices_handler,
        handlers::delete_device_handler,
        handlers::stats_handler,
        handlers::verify_token_handler,
    ),
    components(schemas(
        UserResponse,
        UserListResponse,
        UpdateUserRequest,
        StatusResponse,
        DeviceResponse,
        DeviceListResponse,
        UserDeviceResponse,
        UserDeviceListResponse,
        ProfileResponse,
        StatsResponse,
        VerifyResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Users", description = "Account administration"),
        (name = "Devices", description = "Device registry"),
        (name = "Stats", description = "Aggregate counts"),
        (name = "Auth", description = "Token verification"),
    )
)]
pub struct AdminApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_all_routes() {
        let doc = AdminApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/api/admin/users",
            "/api/admin/users/{id}",
            "/api/admin/users/{id}/profile",
            "/api/admin/users/{id}/devices",
            "/api/admin/devices",
            "/api/admin/devices/{id}",
            "/api/admin/stats",
            "/api/auth/verify",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {expected}"
            );
        }
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = AdminApiDoc::openapi();
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearerAuth"));
    }
}
