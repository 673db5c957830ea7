//! OAuth2 access tokens for the REST clients.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sensorhub_auth::{sign_assertion, ServiceAccountKey, DEFAULT_SCOPES};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::error::{StoreError, StoreResult};

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Supplies bearer tokens for outgoing requests.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// A token valid for at least the next request.
    async fn access_token(&self) -> StoreResult<String>;
}

/// A fixed token, e.g. for emulators or short-lived tooling.
#[derive(Clone)]
pub struct StaticAccessToken(String);

impl StaticAccessToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Debug for StaticAccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticAccessToken([REDACTED])")
    }
}

#[async_trait]
impl AccessTokenProvider for StaticAccessToken {
    async fn access_token(&self) -> StoreResult<String> {
        Ok(self.0.clone())
    }
}

/// OAuth2 token response from the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Cached OAuth2 access token.
#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// Returns true if the token is expired or will expire within the grace period.
    fn is_expired(&self, grace_period: Duration) -> bool {
        Utc::now() + grace_period >= self.expires_at
    }
}

/// Exchanges signed service-account assertions for access tokens and caches
/// the result until shortly before expiry.
#[derive(Debug)]
pub struct ServiceAccountTokenCache {
    key: ServiceAccountKey,
    http_client: reqwest::Client,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
    /// Grace period before expiry to trigger refresh (default: 5 minutes).
    grace_period: Duration,
}

impl ServiceAccountTokenCache {
    /// Creates a new token cache.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Config` if the HTTP client cannot be created.
    pub fn new(key: ServiceAccountKey) -> StoreResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| StoreError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            key,
            http_client,
            cached_token: Arc::new(RwLock::new(None)),
            grace_period: Duration::minutes(5),
        })
    }

    /// Invalidates the cached token, forcing a refresh on next use.
    pub async fn invalidate(&self) {
        let mut cache = self.cached_token.write().await;
        *cache = None;
    }

    #[instrument(skip(self), fields(client_email = %self.key.client_email))]
    async fn acquire_token(&self) -> StoreResult<CachedToken> {
        let assertion = sign_assertion(&self.key, DEFAULT_SCOPES)?;
        let params = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];

        let response = self
            .http_client
            .post(&self.key.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| StoreError::Auth(format!("Token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Auth(format!(
                "Token request failed with status {status}: {body}"
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Auth(format!("Failed to parse token response: {e}")))?;

        let expires_at = Utc::now() + Duration::seconds(token_response.expires_in);
        debug!(%expires_at, "Acquired new access token");

        Ok(CachedToken {
            access_token: token_response.access_token,
            expires_at,
        })
    }
}

#[async_trait]
impl AccessTokenProvider for ServiceAccountTokenCache {
    async fn access_token(&self) -> StoreResult<String> {
        {
            let cache = self.cached_token.read().await;
            if let Some(ref token) = *cache {
                if !token.is_expired(self.grace_period) {
                    return Ok(token.access_token.clone());
                }
            }
        }

        debug!("Refreshing access token");
        let new_token = self.acquire_token().await?;

        let mut cache = self.cached_token.write().await;
        *cache = Some(new_token.clone());

        Ok(new_token.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cached_token_expiry() {
        let token = CachedToken {
            access_token: "test".to_string(),
            expires_at: Utc::now() + Duration::minutes(10),
        };

        assert!(!token.is_expired(Duration::minutes(5)));
        assert!(token.is_expired(Duration::minutes(15)));
    }

    #[test]
    fn test_static_token_debug_redacted() {
        let token = StaticAccessToken::new("ya29.secret");
        assert!(!format!("{token:?}").contains("ya29"));
    }

    #[tokio::test]
    async fn test_static_token() {
        let token = StaticAccessToken::new("owner");
        assert_eq!(token.access_token().await.unwrap(), "owner");
    }
}
