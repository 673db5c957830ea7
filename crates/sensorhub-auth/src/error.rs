//! Error types for token operations.
//!
//! Provides explicit error variants for all verification failures.

use thiserror::Error;

/// Authentication error types.
///
/// Each variant maps to a specific failure mode when verifying ID tokens,
/// fetching signing keys, or signing service-account assertions.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // Token errors
    /// Token has expired (exp claim is in the past).
    #[error("Token has expired")]
    TokenExpired,

    /// Token signature is invalid.
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Token format is malformed or invalid.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token uses an unsupported algorithm (only RS256 is allowed).
    #[error("Unsupported algorithm: only RS256 is allowed")]
    InvalidAlgorithm,

    /// Required claim is missing from token.
    #[error("Missing required claim: {0}")]
    MissingClaim(String),

    /// Token was issued for a different project.
    #[error("Invalid audience or issuer")]
    WrongProject,

    // JWKS errors
    /// Failed to fetch JWKS from endpoint.
    #[error("JWKS fetch failed: {0}")]
    JwksFetchFailed(String),

    /// Key with specified kid not found in JWKS.
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    // Key errors
    /// RSA key is invalid or malformed.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Service-account credentials could not be read or parsed.
    #[error("Invalid service account: {0}")]
    InvalidServiceAccount(String),
}

impl AuthError {
    /// Check if this error indicates an expired token.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        matches!(self, AuthError::TokenExpired)
    }

    /// Check if this error was caused by the presented token rather than by
    /// key retrieval or server configuration.
    #[must_use]
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            AuthError::TokenExpired
                | AuthError::InvalidSignature
                | AuthError::InvalidToken(_)
                | AuthError::InvalidAlgorithm
                | AuthError::MissingClaim(_)
                | AuthError::WrongProject
                | AuthError::KeyNotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(AuthError::TokenExpired.to_string(), "Token has expired");
        assert_eq!(
            AuthError::InvalidToken("malformed base64".to_string()).to_string(),
            "Invalid token: malformed base64"
        );
        assert_eq!(
            AuthError::MissingClaim("sub".to_string()).to_string(),
            "Missing required claim: sub"
        );
        assert_eq!(
            AuthError::WrongProject.to_string(),
            "Invalid audience or issuer"
        );
    }

    #[test]
    fn test_is_token_error() {
        assert!(AuthError::TokenExpired.is_token_error());
        assert!(AuthError::InvalidSignature.is_token_error());
        assert!(AuthError::KeyNotFound("kid-1".to_string()).is_token_error());
        assert!(AuthError::WrongProject.is_token_error());

        assert!(!AuthError::JwksFetchFailed("timeout".to_string()).is_token_error());
        assert!(!AuthError::InvalidServiceAccount("missing".to_string()).is_token_error());
    }
}
