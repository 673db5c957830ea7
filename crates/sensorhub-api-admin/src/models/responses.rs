//! Response models for the admin API.
//!
//! Field names are camelCase on the wire.

use sensorhub_store::{Account, CustomClaims};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

/// Account information returned by the user listing.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub disabled: bool,
    pub email_verified: bool,

    /// Creation time, epoch millis.
    pub created_at: Option<i64>,

    /// Last sign-in time, epoch millis.
    pub last_sign_in_at: Option<i64>,

    #[schema(value_type = Object)]
    pub custom_claims: CustomClaims,

    /// Whether the `admin` claim is `true`.
    pub admin: bool,

    /// Number of devices owned by the account.
    pub device_count: usize,
}

impl UserResponse {
    #[must_use]
    pub fn from_account(account: Account, device_count: usize) -> Self {
        let admin = account.is_admin();
        Self {
            uid: account.uid,
            email: account.email,
            display_name: account.display_name,
            disabled: account.disabled,
            email_verified: account.email_verified,
            created_at: account.created_at,
            last_sign_in_at: account.last_sign_in_at,
            custom_claims: account.custom_claims,
            admin,
            device_count,
        }
    }
}

/// One page of users.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,

    /// Cursor for the following page, `null` on the last page.
    pub next_page_token: Option<String>,

    /// Number of users in this page.
    pub total: usize,
}

/// Acknowledgement for mutations.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

impl StatusResponse {
    /// `{"status": "ok", "message": <message>}`.
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
        }
    }
}

/// A device in the global device listing.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeviceResponse {
    pub device_id: String,
    pub user_id: Option<String>,

    /// Registration time, epoch millis.
    pub registered_at: Option<i64>,

    /// Latest record timestamp for the device, epoch millis.
    pub last_active: Option<i64>,

    /// Owner email; absent for unowned devices, `"Unknown"` if the owner
    /// could not be resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub user_email: Option<Option<String>>,

    /// Owner display name; absent for unowned devices, `"Deleted User"` if
    /// the owner could not be resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub user_display_name: Option<Option<String>>,
}

/// All devices, newest registration first.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeviceListResponse {
    pub devices: Vec<DeviceResponse>,
    pub total: usize,
}

/// A device in a single account's device listing.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDeviceResponse {
    pub device_id: String,
    pub registered_at: Option<i64>,
    pub last_active: Option<i64>,
}

/// Devices owned by one account.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserDeviceListResponse {
    pub devices: Vec<UserDeviceResponse>,
    pub total: usize,
}

/// A stored profile, returned verbatim.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub status: String,
    #[schema(value_type = Object)]
    pub profile: Value,
}

impl ProfileResponse {
    #[must_use]
    pub fn success(profile: Value) -> Self {
        Self {
            status: "success".to_string(),
            profile,
        }
    }
}

/// Aggregate counts.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub user_count: usize,
    pub device_count: usize,
    pub total_records: usize,

    /// Snapshot time, epoch millis.
    pub timestamp: i64,
}

/// Result of verifying the caller's token.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VerifyResponse {
    pub uid: String,
    pub email: Option<String>,
    pub verified: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_device_owner_fields_serialization() {
        let mut device = DeviceResponse {
            device_id: "dev-1".to_string(),
            user_id: None,
            registered_at: None,
            last_active: None,
            user_email: None,
            user_display_name: None,
        };
        let unowned = serde_json::to_value(&device).unwrap();
        assert!(unowned.get("userEmail").is_none());
        assert_eq!(unowned["lastActive"], Value::Null);

        device.user_id = Some("uid-1".to_string());
        device.user_email = Some(None);
        device.user_display_name = Some(Some("Ada".to_string()));
        let owned = serde_json::to_value(&device).unwrap();
        assert_eq!(owned["userEmail"], Value::Null);
        assert_eq!(owned["userDisplayName"], "Ada");
    }

    #[test]
    fn test_user_response_derives_admin() {
        let mut claims = CustomClaims::new();
        claims.insert("admin".to_string(), json!(true));
        let account = Account {
            uid: "uid-1".to_string(),
            custom_claims: claims,
            ..Default::default()
        };

        let value = serde_json::to_value(UserResponse::from_account(account, 2)).unwrap();

        assert_eq!(value["admin"], true);
        assert_eq!(value["deviceCount"], 2);
        assert_eq!(value["customClaims"], json!({ "admin": true }));
        assert_eq!(value["lastSignInAt"], Value::Null);
    }
}
