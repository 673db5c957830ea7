//! Error types for the identity service and database collaborators.

use thiserror::Error;

/// Result type alias using `StoreError`.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised while talking to the identity service or the database.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Client configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Obtaining an access token failed.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The identity service returned an error response.
    #[error("Identity service error: {status} - {message}")]
    IdentityApi { status: u16, message: String },

    /// The database returned an error response.
    #[error("Database error: {status} - {message}")]
    Database { status: u16, message: String },

    /// The requested entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A key cannot be used as a database path segment.
    #[error("Invalid key: {0:?}")]
    InvalidKey(String),

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Injected failure from an in-memory collaborator.
    #[error("Simulated failure in {0}")]
    Simulated(String),
}

impl StoreError {
    /// Check whether this error means the entity is absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

impl From<sensorhub_auth::AuthError> for StoreError {
    fn from(err: sensorhub_auth::AuthError) -> Self {
        StoreError::Auth(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::IdentityApi {
            status: 400,
            message: "INVALID_ID_TOKEN".to_string(),
        };
        assert_eq!(err.to_string(), "Identity service error: 400 - INVALID_ID_TOKEN");
        assert_eq!(
            StoreError::InvalidKey("a/b".to_string()).to_string(),
            "Invalid key: \"a/b\""
        );
    }

    #[test]
    fn test_is_not_found() {
        assert!(StoreError::NotFound("uid-1".to_string()).is_not_found());
        assert!(!StoreError::Auth("expired".to_string()).is_not_found());
    }
}
