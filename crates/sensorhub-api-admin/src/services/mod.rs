//! Business logic for the admin API.

mod admin_service;

pub use admin_service::{AdminService, DeleteStep, UNKNOWN_OWNER_EMAIL, UNKNOWN_OWNER_NAME};
