//! Firebase ID token claims.
//!
//! Provides the `IdTokenClaims` struct containing the standard claims of a
//! Firebase ID token plus the open-ended custom claims map that carries the
//! `admin` flag.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the custom claim that marks an account as administrator.
pub const ADMIN_CLAIM: &str = "admin";

/// Claims of a verified Firebase ID token.
///
/// # Standard Claims
///
/// - `sub`: the account uid
/// - `iss`: `https://securetoken.google.com/<project>`
/// - `aud`: the project id
/// - `exp` / `iat`: Unix timestamps
///
/// Every other top-level claim (including custom claims set through the
/// identity service, `firebase`, `auth_time`) lands in `custom`.
///
/// # Example
///
/// ```rust
/// use sensorhub_auth::IdTokenClaims;
///
/// let claims = IdTokenClaims::builder()
///     .subject("uid-123")
///     .project("demo-project")
///     .email("admin@example.com")
///     .admin(true)
///     .expires_in_secs(3600)
///     .build();
///
/// assert_eq!(claims.uid(), "uid-123");
/// assert!(claims.is_admin());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IdTokenClaims {
    /// Subject - the account uid.
    pub sub: String,

    /// Issuer.
    pub iss: String,

    /// Audience - the Firebase project id.
    pub aud: String,

    /// Expiration time as Unix timestamp.
    pub exp: i64,

    /// Issued at as Unix timestamp.
    pub iat: i64,

    /// Account email address, when the account has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Whether the email address has been verified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,

    /// Remaining claims, including developer-set custom claims.
    #[serde(flatten)]
    pub custom: Map<String, Value>,
}

impl IdTokenClaims {
    /// Create a new builder for constructing claims.
    #[must_use]
    pub fn builder() -> IdTokenClaimsBuilder {
        IdTokenClaimsBuilder::default()
    }

    /// The account uid this token was issued for.
    #[must_use]
    pub fn uid(&self) -> &str {
        &self.sub
    }

    /// Check if the token is expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Check whether the `admin` custom claim is set to `true`.
    ///
    /// Any other value (missing, `false`, a string) is treated as non-admin.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self.custom.get(ADMIN_CLAIM), Some(Value::Bool(true)))
    }

    /// Look up a custom claim by name.
    #[must_use]
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.custom.get(name)
    }
}

/// Builder for constructing ID token claims, mainly for tests and tooling.
#[derive(Debug, Default)]
pub struct IdTokenClaimsBuilder {
    sub: Option<String>,
    project: Option<String>,
    exp: Option<i64>,
    iat: Option<i64>,
    email: Option<String>,
    email_verified: Option<bool>,
    custom: Map<String, Value>,
}

impl IdTokenClaimsBuilder {
    /// Set the subject (account uid).
    #[must_use]
    pub fn subject(mut self, sub: impl Into<String>) -> Self {
        self.sub = Some(sub.into());
        self
    }

    /// Set the project; derives both `aud` and `iss`.
    #[must_use]
    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Set expiration time as Unix timestamp.
    #[must_use]
    pub fn expiration(mut self, exp: i64) -> Self {
        self.exp = Some(exp);
        self
    }

    /// Set expiration time as seconds from now.
    #[must_use]
    pub fn expires_in_secs(mut self, secs: i64) -> Self {
        self.exp = Some(Utc::now().timestamp() + secs);
        self
    }

    /// Set the issued at time.
    #[must_use]
    pub fn issued_at(mut self, iat: i64) -> Self {
        self.iat = Some(iat);
        self
    }

    /// Set the email address.
    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the email verification flag.
    #[must_use]
    pub fn email_verified(mut self, verified: bool) -> Self {
        self.email_verified = Some(verified);
        self
    }

    /// Set the `admin` custom claim.
    #[must_use]
    pub fn admin(self, admin: bool) -> Self {
        self.claim(ADMIN_CLAIM, Value::Bool(admin))
    }

    /// Set an arbitrary custom claim.
    #[must_use]
    pub fn claim(mut self, name: impl Into<String>, value: Value) -> Self {
        self.custom.insert(name.into(), value);
        self
    }

    /// Build the claims.
    ///
    /// Missing values default to: empty subject, empty project, issued now,
    /// expiring in one hour.
    #[must_use]
    pub fn build(self) -> IdTokenClaims {
        let now = Utc::now().timestamp();
        let project = self.project.unwrap_or_default();
        IdTokenClaims {
            sub: self.sub.unwrap_or_default(),
            iss: format!("https://securetoken.google.com/{project}"),
            aud: project,
            exp: self.exp.unwrap_or(now + 3600),
            iat: self.iat.unwrap_or(now),
            email: self.email,
            email_verified: self.email_verified,
            custom: self.custom,
        }
    }
}
