//! Token handling for the SensorHub admin service.
//!
//! This crate provides:
//! - Firebase ID token verification (RS256, keys selected by `kid` from
//!   Google's published JWKS)
//! - The decoded [`IdTokenClaims`] with access to custom claims such as `admin`
//! - Signed service-account assertions for the OAuth2 JWT bearer grant
//!
//! # Example
//!
//! ```rust,ignore
//! use sensorhub_auth::{FirebaseTokenVerifier, TokenVerifier};
//!
//! let verifier = FirebaseTokenVerifier::from_jwks_url("my-project", jwks_url)?;
//! let claims = verifier.verify(&token).await?;
//! if claims.is_admin() {
//!     println!("admin {}", claims.uid());
//! }
//! ```

mod claims;
mod error;
mod jwks;
mod service_account;
mod verifier;

#[cfg(any(test, feature = "testing"))]
pub mod test_keys;

pub use claims::{IdTokenClaims, IdTokenClaimsBuilder, ADMIN_CLAIM};
pub use error::AuthError;
pub use jwks::{Jwk, JwkSet, JwksClient, FIREBASE_JWKS_URL};
pub use service_account::{sign_assertion, ServiceAccountKey, DEFAULT_SCOPES};
pub use verifier::{FirebaseTokenVerifier, TokenVerifier, ValidationConfig};
