//! Request models for the admin API.

use sensorhub_store::AccountUpdate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

/// Query parameters for listing users.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ListUsersQuery {
    /// Maximum number of users to return (default: 100, max: 1000).
    #[serde(default)]
    pub limit: Option<i64>,

    /// Cursor returned as `nextPageToken` by the previous page.
    #[serde(default)]
    pub page_token: Option<String>,
}

impl ListUsersQuery {
    /// Default page size.
    pub const DEFAULT_LIMIT: i64 = 100;

    /// Maximum allowed page size.
    pub const MAX_LIMIT: i64 = 1000;

    /// Get the limit, clamped to valid range.
    #[must_use]
    pub fn limit(&self) -> u32 {
        // Clamped to 1..=1000, so the cast cannot truncate.
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT) as u32
    }

    /// The page cursor, treating an empty value as absent.
    #[must_use]
    pub fn page_token(&self) -> Option<&str> {
        self.page_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Request to update an account. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    /// New email address.
    #[serde(default)]
    pub email: Option<String>,

    /// New display name.
    #[serde(default)]
    pub display_name: Option<String>,

    /// Disable or re-enable sign-in.
    #[serde(default)]
    pub disabled: Option<bool>,

    /// Grant or revoke the admin claim. Other claims are preserved.
    #[serde(default)]
    pub admin: Option<bool>,
}

impl UpdateUserRequest {
    /// The non-claim part of the request.
    #[must_use]
    pub fn account_update(&self) -> AccountUpdate {
        AccountUpdate {
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            disabled: self.disabled,
        }
    }
}
