//! Firebase ID token verification.
//!
//! A token is accepted only if it is an RS256 JWT signed by one of the
//! published keys (selected by the header `kid`), unexpired, issued by
//! `https://securetoken.google.com/<project>` for audience `<project>`, and
//! carries a non-empty subject.

use crate::claims::IdTokenClaims;
use crate::error::AuthError;
use crate::jwks::JwksClient;
use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, TokenData, Validation};
use std::collections::HashMap;

/// Configuration for ID token validation.
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Leeway in seconds for exp/iat validation (clock skew tolerance).
    pub leeway: u64,
    /// Whether to validate expiration.
    pub validate_exp: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            leeway: 60,
            validate_exp: true,
        }
    }
}

/// Verifies bearer tokens and returns their claims.
///
/// The HTTP layer depends on this trait so tests can swap in a fixed key set.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verify `token` and return its decoded claims.
    async fn verify(&self, token: &str) -> Result<IdTokenClaims, AuthError>;
}

enum KeySource {
    Jwks(JwksClient),
    Static(HashMap<String, DecodingKey>),
}

/// Verifier for Firebase ID tokens of a single project.
pub struct FirebaseTokenVerifier {
    project_id: String,
    keys: KeySource,
    config: ValidationConfig,
}

impl FirebaseTokenVerifier {
    /// Create a verifier that resolves signing keys through `jwks`.
    #[must_use]
    pub fn new(project_id: impl Into<String>, jwks: JwksClient) -> Self {
        Self {
            project_id: project_id.into(),
            keys: KeySource::Jwks(jwks),
            config: ValidationConfig::default(),
        }
    }

    /// Create a verifier that fetches keys from a JWKS endpoint.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::JwksFetchFailed` if the HTTP client cannot be created.
    pub fn from_jwks_url(
        project_id: impl Into<String>,
        url: impl Into<String>,
    ) -> Result<Self, AuthError> {
        Ok(Self::new(project_id, JwksClient::new(url)?))
    }

    /// Create a verifier over a fixed set of `kid -> key` pairs.
    #[must_use]
    pub fn with_static_keys(
        project_id: impl Into<String>,
        keys: impl IntoIterator<Item = (String, DecodingKey)>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            keys: KeySource::Static(keys.into_iter().collect()),
            config: ValidationConfig::default(),
        }
    }

    /// Replace the validation config.
    #[must_use]
    pub fn with_validation_config(mut self, config: ValidationConfig) -> Self {
        self.config = config;
        self
    }

    /// The project tokens must be issued for.
    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    fn expected_issuer(&self) -> String {
        format!("https://securetoken.google.com/{}", self.project_id)
    }

    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        match &self.keys {
            KeySource::Jwks(client) => client.get_key(kid).await?.to_decoding_key(),
            KeySource::Static(keys) => keys
                .get(kid)
                .cloned()
                .ok_or_else(|| AuthError::KeyNotFound(kid.to_string())),
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = self.config.leeway;
        validation.validate_exp = self.config.validate_exp;
        validation.algorithms = vec![Algorithm::RS256];
        validation.set_issuer(&[self.expected_issuer()]);
        validation.set_audience(&[self.project_id.as_str()]);
        validation.set_required_spec_claims(&["exp", "iat", "sub", "iss", "aud"]);
        validation
    }
}

#[async_trait]
impl TokenVerifier for FirebaseTokenVerifier {
    async fn verify(&self, token: &str) -> Result<IdTokenClaims, AuthError> {
        let header = jsonwebtoken::decode_header(token)
            .map_err(|e| AuthError::InvalidToken(format!("Invalid token header: {e}")))?;
        if header.alg != Algorithm::RS256 {
            return Err(AuthError::InvalidAlgorithm);
        }
        let kid = header
            .kid
            .ok_or_else(|| AuthError::MissingClaim("kid".to_string()))?;

        let key = self.decoding_key(&kid).await?;
        let token_data: TokenData<IdTokenClaims> =
            decode(token, &key, &self.validation()).map_err(map_jwt_error)?;

        let claims = token_data.claims;
        if claims.sub.is_empty() {
            return Err(AuthError::MissingClaim("sub".to_string()));
        }

        tracing::trace!(uid = %claims.sub, "ID token verified");
        Ok(claims)
    }
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    use jsonwebtoken::errors::ErrorKind;

    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::InvalidAlgorithm => AuthError::InvalidAlgorithm,
        ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience => AuthError::WrongProject,
        ErrorKind::InvalidToken => AuthError::InvalidToken("Malformed token".to_string()),
        ErrorKind::Base64(_) => AuthError::InvalidToken("Invalid base64 encoding".to_string()),
        ErrorKind::Json(_) => AuthError::InvalidToken("Invalid JSON in claims".to_string()),
        ErrorKind::MissingRequiredClaim(claim) => AuthError::MissingClaim(claim.to_string()),
        _ => AuthError::InvalidToken(format!("Token validation failed: {err}")),
    }
}
