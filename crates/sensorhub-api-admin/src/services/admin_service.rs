//! Admin operations over the identity service and the database.

use crate::error::AdminApiError;
use crate::models::{
    DeviceListResponse, DeviceResponse, ListUsersQuery, ProfileResponse, StatsResponse,
    UpdateUserRequest, UserDeviceListResponse, UserDeviceResponse, UserListResponse, UserResponse,
};
use chrono::Utc;
use sensorhub_auth::ADMIN_CLAIM;
use sensorhub_store::{
    last_active_by_device, DeviceRepository, IdentityProvider, ProfileRepository,
    RecordRepository, StoreResult, MAX_PAGE_SIZE,
};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Placeholder email for owners the identity service cannot resolve.
pub const UNKNOWN_OWNER_EMAIL: &str = "Unknown";

/// Placeholder display name for owners the identity service cannot resolve.
pub const UNKNOWN_OWNER_NAME: &str = "Deleted User";

/// Steps of an account deletion, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStep {
    Account,
    Devices,
    Records,
    Profile,
}

impl DeleteStep {
    pub const ALL: [DeleteStep; 4] = [
        DeleteStep::Account,
        DeleteStep::Devices,
        DeleteStep::Records,
        DeleteStep::Profile,
    ];
}

impl fmt::Display for DeleteStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeleteStep::Account => "identity account",
            DeleteStep::Devices => "devices",
            DeleteStep::Records => "records",
            DeleteStep::Profile => "profile",
        })
    }
}

/// Admin operations. Each call reads fresh state; nothing is cached.
#[derive(Clone)]
pub struct AdminService {
    identity: Arc<dyn IdentityProvider>,
    devices: Arc<dyn DeviceRepository>,
    records: Arc<dyn RecordRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

impl AdminService {
    /// Create a new admin service.
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        devices: Arc<dyn DeviceRepository>,
        records: Arc<dyn RecordRepository>,
        profiles: Arc<dyn ProfileRepository>,
    ) -> Self {
        Self {
            identity,
            devices,
            records,
            profiles,
        }
    }

    /// One page of accounts, each with the number of devices it owns.
    ///
    /// Devices are fetched once for the whole page.
    pub async fn list_users(
        &self,
        query: &ListUsersQuery,
    ) -> Result<UserListResponse, AdminApiError> {
        let fail = |e| AdminApiError::service("fetch users", e);

        let page = self
            .identity
            .list_accounts(query.limit(), query.page_token())
            .await
            .map_err(fail)?;
        let devices = self.devices.list_devices().await.map_err(fail)?;

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for owner in devices.iter().filter_map(|d| d.owner.as_deref()) {
            *counts.entry(owner).or_default() += 1;
        }

        let users: Vec<UserResponse> = page
            .accounts
            .into_iter()
            .map(|account| {
                let count = counts.get(account.uid.as_str()).copied().unwrap_or(0);
                UserResponse::from_account(account, count)
            })
            .collect();

        Ok(UserListResponse {
            total: users.len(),
            users,
            next_page_token: page.next_page_token,
        })
    }

    /// Apply the present fields of `request` to account `uid`.
    ///
    /// Non-claim fields go out as one combined update. The admin flag is
    /// merged into the account's existing claims.
    pub async fn update_user(
        &self,
        uid: &str,
        request: &UpdateUserRequest,
    ) -> Result<(), AdminApiError> {
        let fail = |e| AdminApiError::service("update user", e);

        let update = request.account_update();
        if !update.is_empty() {
            self.identity
                .update_account(uid, &update)
                .await
                .map_err(fail)?;
        }

        if let Some(admin) = request.admin {
            let account = self.identity.get_account(uid).await.map_err(fail)?;
            let mut claims = account.custom_claims;
            claims.insert(ADMIN_CLAIM.to_string(), Value::Bool(admin));
            self.identity
                .set_custom_claims(uid, &claims)
                .await
                .map_err(fail)?;
            info!(uid, admin, "Admin claim updated");
        }

        Ok(())
    }

    /// Delete an account and everything it owns.
    ///
    /// Steps run in [`DeleteStep::ALL`] order and stop at the first failure.
    /// Every step tolerates already-deleted data, so a failed deletion can
    /// be completed by calling this again.
    pub async fn delete_user(&self, uid: &str) -> Result<(), AdminApiError> {
        let mut completed: Vec<DeleteStep> = Vec::with_capacity(DeleteStep::ALL.len());

        for step in DeleteStep::ALL {
            match self.run_delete_step(uid, step).await {
                Ok(()) => {
                    debug!(uid, %step, "Delete step completed");
                    completed.push(step);
                }
                Err(e) => {
                    let done = completed
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ");
                    warn!(uid, %step, completed = %done, error = %e, "Delete step failed");
                    return Err(AdminApiError::service(
                        "delete user",
                        format!("step '{step}' failed (completed: [{done}]): {e}"),
                    ));
                }
            }
        }

        info!(uid, "User and associated data deleted");
        Ok(())
    }

    async fn run_delete_step(&self, uid: &str, step: DeleteStep) -> StoreResult<()> {
        match step {
            DeleteStep::Account => match self.identity.delete_account(uid).await {
                Err(e) if e.is_not_found() => {
                    debug!(uid, "Identity account already absent");
                    Ok(())
                }
                other => other,
            },
            DeleteStep::Devices => {
                for device in self.devices.devices_by_owner(uid).await? {
                    self.devices.delete_device(&device.id).await?;
                }
                Ok(())
            }
            DeleteStep::Records => {
                for record in self.records.records_by_owner(uid).await? {
                    self.records.delete_record(&record.id).await?;
                }
                Ok(())
            }
            DeleteStep::Profile => self.profiles.delete_profile(uid).await,
        }
    }

    /// All devices with owner identity and last activity, newest
    /// registration first. Devices without a registration time sort last.
    pub async fn list_devices(&self) -> Result<DeviceListResponse, AdminApiError> {
        let fail = |e| AdminApiError::service("fetch devices", e);

        let devices = self.devices.list_devices().await.map_err(fail)?;
        let records = self.records.list_records().await.map_err(fail)?;
        let last_active = last_active_by_device(&records);

        let mut owners: HashMap<String, (Option<String>, Option<String>)> = HashMap::new();
        let mut entries = Vec::with_capacity(devices.len());

        for device in devices {
            let (user_email, user_display_name) = match device.owner.as_deref() {
                Some(uid) => {
                    if !owners.contains_key(uid) {
                        let resolved = self.resolve_owner(uid).await;
                        owners.insert(uid.to_string(), resolved);
                    }
                    let (email, name) = owners.get(uid).cloned().unwrap_or_default();
                    (Some(email), Some(name))
                }
                None => (None, None),
            };

            entries.push(DeviceResponse {
                last_active: last_active.get(device.id.as_str()).copied(),
                device_id: device.id,
                user_id: device.owner,
                registered_at: device.registered_at,
                user_email,
                user_display_name,
            });
        }

        entries.sort_by_key(|d| std::cmp::Reverse(d.registered_at.unwrap_or(0)));

        Ok(DeviceListResponse {
            total: entries.len(),
            devices: entries,
        })
    }

    async fn resolve_owner(&self, uid: &str) -> (Option<String>, Option<String>) {
        match self.identity.get_account(uid).await {
            Ok(account) => (account.email, account.display_name),
            Err(e) => {
                debug!(uid, error = %e, "Device owner could not be resolved");
                (
                    Some(UNKNOWN_OWNER_EMAIL.to_string()),
                    Some(UNKNOWN_OWNER_NAME.to_string()),
                )
            }
        }
    }

    /// Delete one device. Its records are kept.
    pub async fn delete_device(&self, device_id: &str) -> Result<(), AdminApiError> {
        self.devices
            .delete_device(device_id)
            .await
            .map_err(|e| AdminApiError::service("delete device", e))?;
        info!(device_id, "Device deleted");
        Ok(())
    }

    /// The stored profile of account `uid`.
    pub async fn get_profile(&self, uid: &str) -> Result<ProfileResponse, AdminApiError> {
        self.profiles
            .get_profile(uid)
            .await
            .map_err(|e| AdminApiError::service("fetch user profile", e))?
            .filter(|profile| !is_blank(profile))
            .map(ProfileResponse::success)
            .ok_or_else(|| AdminApiError::NotFound("User profile not found".to_string()))
    }

    /// Devices owned by `uid`, with last activity.
    pub async fn user_devices(&self, uid: &str) -> Result<UserDeviceListResponse, AdminApiError> {
        let fail = |e| AdminApiError::service("fetch user devices", e);

        let devices = self.devices.devices_by_owner(uid).await.map_err(fail)?;
        if devices.is_empty() {
            return Ok(UserDeviceListResponse {
                devices: Vec::new(),
                total: 0,
            });
        }

        let records = self.records.list_records().await.map_err(fail)?;
        let last_active = last_active_by_device(&records);

        let devices: Vec<UserDeviceResponse> = devices
            .into_iter()
            .map(|device| UserDeviceResponse {
                last_active: last_active.get(device.id.as_str()).copied(),
                device_id: device.id,
                registered_at: device.registered_at,
            })
            .collect();

        Ok(UserDeviceListResponse {
            total: devices.len(),
            devices,
        })
    }

    /// Account, device and record counts, computed fresh.
    pub async fn stats(&self) -> Result<StatsResponse, AdminApiError> {
        let fail = |e| AdminApiError::service("fetch stats", e);

        let mut user_count = 0;
        let mut page_token: Option<String> = None;
        loop {
            let page = self
                .identity
                .list_accounts(MAX_PAGE_SIZE, page_token.as_deref())
                .await
                .map_err(fail)?;
            user_count += page.accounts.len();
            match page.next_page_token {
                Some(next) if page_token.as_deref() != Some(next.as_str()) => {
                    page_token = Some(next);
                }
                _ => break,
            }
        }

        let device_count = self.devices.list_devices().await.map_err(fail)?.len();
        let total_records = self.records.count_records().await.map_err(fail)?;

        Ok(StatsResponse {
            user_count,
            device_count,
            total_records,
            timestamp: Utc::now().timestamp_millis(),
        })
    }
}

/// Stored values that count as "no profile": null, empty strings, `false`,
/// zero and empty collections.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}
