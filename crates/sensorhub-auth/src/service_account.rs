//! Service-account credentials and signed assertions.
//!
//! A service account authenticates to Google APIs by signing a short-lived
//! RS256 assertion and exchanging it at `token_uri` for an access token
//! (OAuth2 JWT bearer grant, RFC 7523).

use crate::error::AuthError;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Scopes requested for admin access to the identity service and database.
pub const DEFAULT_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/cloud-platform",
    "https://www.googleapis.com/auth/firebase.database",
    "https://www.googleapis.com/auth/identitytoolkit",
    "https://www.googleapis.com/auth/userinfo.email",
];

/// Assertion lifetime; Google rejects anything above one hour.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// The subset of a service-account key file needed for the bearer grant.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    /// Account email, used as the assertion issuer.
    pub client_email: String,

    /// PEM-encoded RSA private key.
    pub private_key: String,

    /// Token endpoint the assertion is exchanged at.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,

    /// Project the account belongs to.
    #[serde(default)]
    pub project_id: Option<String>,

    /// Id of the private key, forwarded as the assertion `kid`.
    #[serde(default)]
    pub private_key_id: Option<String>,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .field("project_id", &self.project_id)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

impl ServiceAccountKey {
    /// Parse a key from its JSON representation.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidServiceAccount` if the JSON is malformed
    /// or lacks required fields.
    pub fn from_json(json: &str) -> Result<Self, AuthError> {
        serde_json::from_str(json).map_err(|e| AuthError::InvalidServiceAccount(e.to_string()))
    }

    /// Read and parse a key file.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidServiceAccount` if the file cannot be read
    /// or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AuthError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            AuthError::InvalidServiceAccount(format!("{}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// Sign a JWT bearer assertion for `key` requesting `scopes`.
///
/// # Errors
///
/// Returns `AuthError::InvalidKey` if the private key is not a valid RSA PEM.
pub fn sign_assertion(key: &ServiceAccountKey, scopes: &[&str]) -> Result<String, AuthError> {
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| AuthError::InvalidKey(format!("Invalid private key: {e}")))?;

    let now = Utc::now().timestamp();
    let claims = AssertionClaims {
        iss: &key.client_email,
        scope: scopes.join(" "),
        aud: &key.token_uri,
        iat: now,
        exp: now + ASSERTION_LIFETIME_SECS,
    };

    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();

    encode(&header, &claims, &encoding_key)
        .map_err(|e| AuthError::InvalidToken(format!("Encoding failed: {e}")))
}
