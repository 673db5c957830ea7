//! Collaborators behind the SensorHub admin surface.
//!
//! - [`IdentityProvider`]: the account directory, implemented over the
//!   Identity Toolkit REST API by [`IdentityToolkitClient`]
//! - [`DeviceRepository`], [`RecordRepository`], [`ProfileRepository`]: the
//!   `/devices`, `/records` and `/user_profiles` collections, implemented over
//!   the Realtime Database REST API by [`RealtimeDatabaseClient`]
//! - [`memory`]: in-memory implementations of all four traits
//!
//! Both REST clients authenticate with an [`AccessTokenProvider`], normally a
//! [`ServiceAccountTokenCache`].

pub mod credentials;
pub mod error;
pub mod identity_toolkit;
pub mod memory;
pub mod models;
pub mod realtime_db;
pub mod traits;

pub use credentials::{AccessTokenProvider, ServiceAccountTokenCache, StaticAccessToken};
pub use error::{StoreError, StoreResult};
pub use identity_toolkit::{IdentityToolkitClient, IDENTITY_TOOLKIT_URL, MAX_PAGE_SIZE};
pub use memory::{InMemoryDatabase, InMemoryIdentityProvider};
pub use models::{
    last_active_by_device, parse_timestamp, Account, AccountPage, AccountUpdate, CustomClaims,
    Device, Record,
};
pub use realtime_db::RealtimeDatabaseClient;
pub use traits::{DeviceRepository, IdentityProvider, ProfileRepository, RecordRepository};
