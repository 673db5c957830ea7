//! In-memory collaborators.
//!
//! Used by service and router tests, and handy for local runs without
//! network access. Individual operations can be made to fail by name with
//! `fail_on`, e.g. `fail_on("delete_account")`.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::models::{Account, AccountPage, AccountUpdate, CustomClaims, Device, Record};
use crate::traits::{DeviceRepository, IdentityProvider, ProfileRepository, RecordRepository};

#[derive(Debug, Default)]
struct FailureSwitch(RwLock<HashSet<String>>);

impl FailureSwitch {
    async fn set(&self, operation: &str) {
        self.0.write().await.insert(operation.to_string());
    }

    async fn check(&self, operation: &str) -> StoreResult<()> {
        if self.0.read().await.contains(operation) {
            return Err(StoreError::Simulated(operation.to_string()));
        }
        Ok(())
    }
}

/// Accounts held in memory, ordered by uid.
#[derive(Debug, Default)]
pub struct InMemoryIdentityProvider {
    accounts: RwLock<BTreeMap<String, Account>>,
    failures: FailureSwitch,
}

impl InMemoryIdentityProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an account.
    pub async fn insert(&self, account: Account) {
        self.accounts
            .write()
            .await
            .insert(account.uid.clone(), account);
    }

    /// Make `operation` (a trait method name) fail from now on.
    pub async fn fail_on(&self, operation: &str) {
        self.failures.set(operation).await;
    }

    /// Current copy of an account, bypassing failure injection.
    pub async fn snapshot(&self, uid: &str) -> Option<Account> {
        self.accounts.read().await.get(uid).cloned()
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn list_accounts(
        &self,
        page_size: u32,
        page_token: Option<&str>,
    ) -> StoreResult<AccountPage> {
        self.failures.check("list_accounts").await?;
        let accounts = self.accounts.read().await;
        let page_size = page_size.max(1) as usize;

        // The page token is the last uid of the previous page.
        let remaining: Vec<Account> = accounts
            .values()
            .filter(|a| page_token.map_or(true, |after| a.uid.as_str() > after))
            .take(page_size + 1)
            .cloned()
            .collect();

        let has_more = remaining.len() > page_size;
        let page: Vec<Account> = remaining.into_iter().take(page_size).collect();
        let next_page_token = if has_more {
            page.last().map(|a| a.uid.clone())
        } else {
            None
        };

        Ok(AccountPage {
            accounts: page,
            next_page_token,
        })
    }

    async fn get_account(&self, uid: &str) -> StoreResult<Account> {
        self.failures.check("get_account").await?;
        self.accounts
            .read()
            .await
            .get(uid)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(uid.to_string()))
    }

    async fn update_account(&self, uid: &str, update: &AccountUpdate) -> StoreResult<()> {
        self.failures.check("update_account").await?;
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(uid)
            .ok_or_else(|| StoreError::NotFound(uid.to_string()))?;

        if let Some(email) = &update.email {
            account.email = Some(email.clone());
        }
        if let Some(name) = &update.display_name {
            account.display_name = Some(name.clone());
        }
        if let Some(disabled) = update.disabled {
            account.disabled = disabled;
        }
        Ok(())
    }

    async fn set_custom_claims(&self, uid: &str, claims: &CustomClaims) -> StoreResult<()> {
        self.failures.check("set_custom_claims").await?;
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(uid)
            .ok_or_else(|| StoreError::NotFound(uid.to_string()))?;
        account.custom_claims = claims.clone();
        Ok(())
    }

    async fn delete_account(&self, uid: &str) -> StoreResult<()> {
        self.failures.check("delete_account").await?;
        self.accounts
            .write()
            .await
            .remove(uid)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(uid.to_string()))
    }
}

/// The three database collections held in memory.
#[derive(Debug, Default)]
pub struct InMemoryDatabase {
    devices: RwLock<BTreeMap<String, Value>>,
    records: RwLock<BTreeMap<String, Value>>,
    profiles: RwLock<BTreeMap<String, Value>>,
    failures: FailureSwitch,
}

impl InMemoryDatabase {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_device(&self, id: impl Into<String>, value: Value) {
        self.devices.write().await.insert(id.into(), value);
    }

    pub async fn insert_record(&self, id: impl Into<String>, value: Value) {
        self.records.write().await.insert(id.into(), value);
    }

    pub async fn insert_profile(&self, uid: impl Into<String>, value: Value) {
        self.profiles.write().await.insert(uid.into(), value);
    }

    /// Make `operation` (a trait method name) fail from now on.
    pub async fn fail_on(&self, operation: &str) {
        self.failures.set(operation).await;
    }

    /// Number of stored records, bypassing failure injection.
    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl DeviceRepository for InMemoryDatabase {
    async fn list_devices(&self) -> StoreResult<Vec<Device>> {
        self.failures.check("list_devices").await?;
        Ok(self
            .devices
            .read()
            .await
            .iter()
            .map(|(id, value)| Device::from_entry(id.clone(), value.clone()))
            .collect())
    }

    async fn devices_by_owner(&self, uid: &str) -> StoreResult<Vec<Device>> {
        self.failures.check("devices_by_owner").await?;
        Ok(self
            .devices
            .read()
            .await
            .iter()
            .map(|(id, value)| Device::from_entry(id.clone(), value.clone()))
            .filter(|d| d.is_owned_by(uid))
            .collect())
    }

    async fn delete_device(&self, device_id: &str) -> StoreResult<()> {
        self.failures.check("delete_device").await?;
        self.devices.write().await.remove(device_id);
        Ok(())
    }
}

#[async_trait]
impl RecordRepository for InMemoryDatabase {
    async fn list_records(&self) -> StoreResult<Vec<Record>> {
        self.failures.check("list_records").await?;
        Ok(self
            .records
            .read()
            .await
            .iter()
            .map(|(id, value)| Record::from_entry(id.clone(), value.clone()))
            .collect())
    }

    async fn records_by_owner(&self, uid: &str) -> StoreResult<Vec<Record>> {
        let mut records = self.list_records().await?;
        records.retain(|r| r.owner.as_deref() == Some(uid));
        Ok(records)
    }

    async fn records_by_device(&self, device_id: &str) -> StoreResult<Vec<Record>> {
        let mut records = self.list_records().await?;
        records.retain(|r| r.device_id.as_deref() == Some(device_id));
        Ok(records)
    }

    async fn delete_record(&self, record_id: &str) -> StoreResult<()> {
        self.failures.check("delete_record").await?;
        self.records.write().await.remove(record_id);
        Ok(())
    }

    async fn count_records(&self) -> StoreResult<usize> {
        self.failures.check("count_records").await?;
        Ok(self.records.read().await.len())
    }
}

#[async_trait]
impl ProfileRepository for InMemoryDatabase {
    async fn get_profile(&self, uid: &str) -> StoreResult<Option<Value>> {
        self.failures.check("get_profile").await?;
        Ok(self
            .profiles
            .read()
            .await
            .get(uid)
            .filter(|p| !p.is_null())
            .cloned())
    }

    async fn delete_profile(&self, uid: &str) -> StoreResult<()> {
        self.failures.check("delete_profile").await?;
        self.profiles.write().await.remove(uid);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn account(uid: &str) -> Account {
        Account {
            uid: uid.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_pagination_walks_all_accounts() {
        let identity = InMemoryIdentityProvider::new();
        for uid in ["a", "b", "c", "d", "e"] {
            identity.insert(account(uid)).await;
        }

        let first = identity.list_accounts(2, None).await.unwrap();
        assert_eq!(first.accounts.len(), 2);
        let second = identity
            .list_accounts(2, first.next_page_token.as_deref())
            .await
            .unwrap();
        let third = identity
            .list_accounts(2, second.next_page_token.as_deref())
            .await
            .unwrap();

        assert_eq!(third.accounts.len(), 1);
        assert_eq!(third.accounts[0].uid, "e");
        assert!(third.next_page_token.is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_account_is_not_found() {
        let identity = InMemoryIdentityProvider::new();
        let err = identity.delete_account("ghost").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_fail_on_injects_error() {
        let db = InMemoryDatabase::new();
        db.fail_on("list_devices").await;

        let err = db.list_devices().await.unwrap_err();
        assert!(matches!(err, StoreError::Simulated(ref op) if op == "list_devices"));
        assert!(db.list_records().await.is_ok());
    }

    #[tokio::test]
    async fn test_null_profile_is_absent() {
        let db = InMemoryDatabase::new();
        db.insert_profile("uid-1", Value::Null).await;
        db.insert_profile("uid-2", json!({ "name": "Ada" })).await;

        assert!(db.get_profile("uid-1").await.unwrap().is_none());
        assert!(db.get_profile("uid-2").await.unwrap().is_some());
    }
}
