//! Authentication and authorization middleware.

mod admin_guard;
mod firebase_auth;

pub use admin_guard::admin_guard;
pub use firebase_auth::{bearer_token, firebase_auth_middleware};
