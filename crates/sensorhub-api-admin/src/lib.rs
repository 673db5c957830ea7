//! Admin HTTP API for SensorHub.
//!
//! Exposes account, device and statistics administration over the identity
//! service and the realtime database. Every admin route requires a verified
//! Firebase ID token whose claims contain `admin: true`.
//!
//! # Example
//!
//! ```rust,ignore
//! use sensorhub_api_admin::{api_router, AdminService, AdminState};
//!
//! let service = AdminService::new(identity, devices, records, profiles);
//! let app = api_router(AdminState::new(service, verifier));
//! ```

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod router;
pub mod services;

pub use error::AdminApiError;
pub use openapi::AdminApiDoc;
pub use router::{admin_router, api_router, auth_router, AdminState};
pub use services::AdminService;
