//! Realtime Database REST client.
//!
//! Every node is addressed as `{database_url}/{path}.json`. Reads of absent
//! nodes return `null`; deletes of absent nodes succeed.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::credentials::AccessTokenProvider;
use crate::error::{StoreError, StoreResult};
use crate::models::{Device, Record};
use crate::traits::{DeviceRepository, ProfileRepository, RecordRepository};

/// Collection holding devices.
pub const DEVICES_PATH: &str = "devices";
/// Collection holding telemetry records.
pub const RECORDS_PATH: &str = "records";
/// Collection holding user profiles.
pub const PROFILES_PATH: &str = "user_profiles";

/// Characters the database forbids in keys.
const FORBIDDEN_KEY_CHARS: &[char] = &['.', '$', '#', '[', ']', '/'];

/// Reject keys that would address a different node than intended.
fn validate_key(key: &str) -> StoreResult<&str> {
    if key.is_empty()
        || key.contains(FORBIDDEN_KEY_CHARS)
        || key.chars().any(char::is_control)
    {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(key)
}

/// Split a collection node into `(key, value)` entries.
///
/// Arrays appear when keys happen to be small integers; `null` slots in them
/// are skipped.
fn entries(node: Value) -> Vec<(String, Value)> {
    match node {
        Value::Object(map) => map.into_iter().collect(),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .filter(|(_, v)| !v.is_null())
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        _ => Vec::new(),
    }
}

/// Realtime Database client.
pub struct RealtimeDatabaseClient {
    http_client: reqwest::Client,
    tokens: Arc<dyn AccessTokenProvider>,
    database_url: String,
}

impl std::fmt::Debug for RealtimeDatabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeDatabaseClient")
            .field("database_url", &self.database_url)
            .finish_non_exhaustive()
    }
}

impl RealtimeDatabaseClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Config` if the URL is empty or the HTTP client
    /// cannot be created.
    pub fn new(
        database_url: impl Into<String>,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> StoreResult<Self> {
        let database_url = database_url.into().trim_end_matches('/').to_string();
        if database_url.is_empty() {
            return Err(StoreError::Config("Database URL is empty".to_string()));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| StoreError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            tokens,
            database_url,
        })
    }

    fn node_url(&self, path: &str) -> String {
        format!("{}/{path}.json", self.database_url)
    }

    async fn check(response: reqwest::Response) -> StoreResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Map<String, Value>>(&body)
            .ok()
            .and_then(|m| m.get("error").and_then(Value::as_str).map(str::to_string))
            .unwrap_or(body);

        Err(StoreError::Database {
            status: status.as_u16(),
            message,
        })
    }

    /// Read the node at `path`; `Value::Null` when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the database rejects it.
    #[instrument(skip(self))]
    pub async fn get(&self, path: &str) -> StoreResult<Value> {
        self.get_with_query(path, &[]).await
    }

    async fn get_with_query(&self, path: &str, query: &[(&str, &str)]) -> StoreResult<Value> {
        let token = self.tokens.access_token().await?;
        let response = self
            .http_client
            .get(self.node_url(path))
            .query(query)
            .bearer_auth(token)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    /// Delete the node at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the database rejects it.
    #[instrument(skip(self))]
    pub async fn delete(&self, path: &str) -> StoreResult<()> {
        let token = self.tokens.access_token().await?;
        let response = self
            .http_client
            .delete(self.node_url(path))
            .bearer_auth(token)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn collection(&self, path: &str) -> StoreResult<Vec<(String, Value)>> {
        let node = self.get(path).await?;
        let entries = entries(node);
        debug!(path, count = entries.len(), "Read collection");
        Ok(entries)
    }

    async fn devices(&self) -> StoreResult<Vec<Device>> {
        Ok(self
            .collection(DEVICES_PATH)
            .await?
            .into_iter()
            .map(|(id, value)| Device::from_entry(id, value))
            .collect())
    }

    async fn records(&self) -> StoreResult<Vec<Record>> {
        Ok(self
            .collection(RECORDS_PATH)
            .await?
            .into_iter()
            .map(|(id, value)| Record::from_entry(id, value))
            .collect())
    }
}

#[async_trait]
impl DeviceRepository for RealtimeDatabaseClient {
    async fn list_devices(&self) -> StoreResult<Vec<Device>> {
        self.devices().await
    }

    async fn devices_by_owner(&self, uid: &str) -> StoreResult<Vec<Device>> {
        let mut devices = self.devices().await?;
        devices.retain(|d| d.is_owned_by(uid));
        Ok(devices)
    }

    async fn delete_device(&self, device_id: &str) -> StoreResult<()> {
        let key = validate_key(device_id)?;
        self.delete(&format!("{DEVICES_PATH}/{key}")).await
    }
}

#[async_trait]
impl RecordRepository for RealtimeDatabaseClient {
    async fn list_records(&self) -> StoreResult<Vec<Record>> {
        self.records().await
    }

    async fn records_by_owner(&self, uid: &str) -> StoreResult<Vec<Record>> {
        let mut records = self.records().await?;
        records.retain(|r| r.owner.as_deref() == Some(uid));
        Ok(records)
    }

    async fn records_by_device(&self, device_id: &str) -> StoreResult<Vec<Record>> {
        let mut records = self.records().await?;
        records.retain(|r| r.device_id.as_deref() == Some(device_id));
        Ok(records)
    }

    async fn delete_record(&self, record_id: &str) -> StoreResult<()> {
        let key = validate_key(record_id)?;
        self.delete(&format!("{RECORDS_PATH}/{key}")).await
    }

    #[instrument(skip(self))]
    async fn count_records(&self) -> StoreResult<usize> {
        // Shallow reads return `{key: true}` without the record bodies.
        let node = self
            .get_with_query(RECORDS_PATH, &[("shallow", "true")])
            .await?;
        Ok(entries(node).len())
    }
}

#[async_trait]
impl ProfileRepository for RealtimeDatabaseClient {
    async fn get_profile(&self, uid: &str) -> StoreResult<Option<Value>> {
        let key = validate_key(uid)?;
        let profile = self.get(&format!("{PROFILES_PATH}/{key}")).await?;
        Ok(Some(profile).filter(|p| !p.is_null()))
    }

    async fn delete_profile(&self, uid: &str) -> StoreResult<()> {
        let key = validate_key(uid)?;
        self.delete(&format!("{PROFILES_PATH}/{key}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("-Nabc123").is_ok());
        assert!(validate_key("uid_42").is_ok());
        for bad in ["", "a/b", "a.b", "$x", "#1", "[0]", "a\nb"] {
            assert!(validate_key(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_entries_from_object_and_array() {
        let object = entries(json!({ "a": 1, "b": 2 }));
        assert_eq!(object.len(), 2);

        let array = entries(json!([null, { "ts": 1 }, null, { "ts": 3 }]));
        let keys: Vec<_> = array.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["1", "3"]);

        assert!(entries(Value::Null).is_empty());
    }
}
