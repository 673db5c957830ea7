//! Collaborator traits for the identity service and the database.
//!
//! The admin service only talks to these traits; the REST clients and the
//! in-memory implementations both satisfy them.

use crate::error::StoreResult;
use crate::models::{Account, AccountPage, AccountUpdate, CustomClaims, Device, Record};
use async_trait::async_trait;
use serde_json::Value;

/// Account directory operations.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Fetch one page of accounts, starting at `page_token`.
    async fn list_accounts(
        &self,
        page_size: u32,
        page_token: Option<&str>,
    ) -> StoreResult<AccountPage>;

    /// Fetch one account. Absent accounts yield `StoreError::NotFound`.
    async fn get_account(&self, uid: &str) -> StoreResult<Account>;

    /// Apply a combined update of the non-claim fields.
    async fn update_account(&self, uid: &str, update: &AccountUpdate) -> StoreResult<()>;

    /// Replace the account's custom claims with `claims`.
    async fn set_custom_claims(&self, uid: &str, claims: &CustomClaims) -> StoreResult<()>;

    /// Delete an account. Absent accounts yield `StoreError::NotFound`.
    async fn delete_account(&self, uid: &str) -> StoreResult<()>;
}

/// Access to `/devices`.
#[async_trait]
pub trait DeviceRepository: Send + Sync {
    /// All devices, in storage order.
    async fn list_devices(&self) -> StoreResult<Vec<Device>>;

    /// Devices whose owner is `uid`.
    async fn devices_by_owner(&self, uid: &str) -> StoreResult<Vec<Device>>;

    /// Remove one device. Removing a missing device succeeds.
    async fn delete_device(&self, device_id: &str) -> StoreResult<()>;
}

/// Access to `/records`.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// All records, in storage order.
    async fn list_records(&self) -> StoreResult<Vec<Record>>;

    /// Records whose owner is `uid`.
    async fn records_by_owner(&self, uid: &str) -> StoreResult<Vec<Record>>;

    /// Records produced by `device_id`.
    async fn records_by_device(&self, device_id: &str) -> StoreResult<Vec<Record>>;

    /// Remove one record. Removing a missing record succeeds.
    async fn delete_record(&self, record_id: &str) -> StoreResult<()>;

    /// Number of records in the collection.
    async fn count_records(&self) -> StoreResult<usize>;
}

/// Access to `/user_profiles`.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// The stored profile, or `None` when absent or null.
    async fn get_profile(&self, uid: &str) -> StoreResult<Option<Value>>;

    /// Remove a profile. Removing a missing profile succeeds.
    async fn delete_profile(&self, uid: &str) -> StoreResult<()>;
}
