//! Domain models for accounts and database entries.
//!
//! Database entries are schemaless; these types pick out the fields the
//! admin surface relies on and keep the rest as raw JSON.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Custom claims attached to an account.
pub type CustomClaims = Map<String, Value>;

/// Owner field on device entries.
pub const DEVICE_OWNER_FIELD: &str = "user_id";
/// Registration timestamp field on device entries.
pub const DEVICE_REGISTERED_FIELD: &str = "registered_at";
/// Owner field on record entries.
pub const RECORD_OWNER_FIELD: &str = "userId";
/// Originating device field on record entries.
pub const RECORD_DEVICE_FIELD: &str = "device_id";
/// Timestamp field on record entries.
pub const RECORD_TIMESTAMP_FIELD: &str = "ts";

/// Interpret a stored timestamp.
///
/// Integers, floats (truncated) and numeric strings are accepted; anything
/// else is treated as missing.
#[must_use]
pub fn parse_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
        }
        _ => None,
    }
}

fn string_field(fields: &Map<String, Value>, name: &str) -> Option<String> {
    fields
        .get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// An account in the identity service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub disabled: bool,
    pub email_verified: bool,
    /// Creation time, epoch millis.
    pub created_at: Option<i64>,
    /// Last sign-in time, epoch millis.
    pub last_sign_in_at: Option<i64>,
    pub custom_claims: CustomClaims,
}

impl Account {
    /// Whether the `admin` custom claim is `true`.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(
            self.custom_claims.get(sensorhub_auth::ADMIN_CLAIM),
            Some(Value::Bool(true))
        )
    }
}

/// One page of accounts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountPage {
    pub accounts: Vec<Account>,
    /// Token for the following page, `None` on the last page.
    pub next_page_token: Option<String>,
}

/// Non-claim account fields to change; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountUpdate {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub disabled: Option<bool>,
}

impl AccountUpdate {
    /// True when no field would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.display_name.is_none() && self.disabled.is_none()
    }
}

/// A registered device (`/devices/{id}`).
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub id: String,
    /// Owning account uid, from `user_id`.
    pub owner: Option<String>,
    /// Registration time, epoch millis, from `registered_at`.
    pub registered_at: Option<i64>,
    /// All stored fields, including the ones above.
    pub fields: Map<String, Value>,
}

impl Device {
    /// Build a device from its key and stored value.
    ///
    /// Non-object values yield a device without fields.
    #[must_use]
    pub fn from_entry(id: impl Into<String>, value: Value) -> Self {
        let fields = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            id: id.into(),
            owner: string_field(&fields, DEVICE_OWNER_FIELD),
            registered_at: fields.get(DEVICE_REGISTERED_FIELD).and_then(parse_timestamp),
            fields,
        }
    }

    /// Whether the device belongs to `uid`.
    #[must_use]
    pub fn is_owned_by(&self, uid: &str) -> bool {
        self.owner.as_deref() == Some(uid)
    }
}

/// A telemetry record (`/records/{id}`).
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    /// Owning account uid, from `userId`.
    pub owner: Option<String>,
    /// Originating device, from `device_id`.
    pub device_id: Option<String>,
    /// Record time, epoch millis, from `ts`.
    pub timestamp: Option<i64>,
    pub fields: Map<String, Value>,
}

impl Record {
    /// Build a record from its key and stored value.
    #[must_use]
    pub fn from_entry(id: impl Into<String>, value: Value) -> Self {
        let fields = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            id: id.into(),
            owner: string_field(&fields, RECORD_OWNER_FIELD),
            device_id: string_field(&fields, RECORD_DEVICE_FIELD),
            timestamp: fields.get(RECORD_TIMESTAMP_FIELD).and_then(parse_timestamp),
            fields,
        }
    }
}

/// Latest record timestamp per device.
///
/// Records without a device or with a missing or zero timestamp are ignored.
#[must_use]
pub fn last_active_by_device(records: &[Record]) -> std::collections::HashMap<&str, i64> {
    let mut latest = std::collections::HashMap::new();
    for record in records {
        let ts = record.timestamp.filter(|ts| *ts != 0);
        if let (Some(device), Some(ts)) = (record.device_id.as_deref(), ts) {
            latest
                .entry(device)
                .and_modify(|cur: &mut i64| *cur = (*cur).max(ts))
                .or_insert(ts);
        }
    }
    latest
}
