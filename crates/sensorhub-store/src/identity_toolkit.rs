//! Identity Toolkit REST client.
//!
//! Account administration goes through the project-scoped endpoints
//! `v1/projects/{project}/accounts:{batchGet,lookup,update,delete}`.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::credentials::AccessTokenProvider;
use crate::error::{StoreError, StoreResult};
use crate::models::{parse_timestamp, Account, AccountPage, AccountUpdate, CustomClaims};
use crate::traits::IdentityProvider;

/// Public Identity Toolkit endpoint.
pub const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com";

/// Largest page `accounts:batchGet` will return.
pub const MAX_PAGE_SIZE: u32 = 1000;

const USER_NOT_FOUND: &str = "USER_NOT_FOUND";

/// Error response from the identity service.
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Account as returned by `batchGet` and `lookup`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserInfo {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    #[serde(default)]
    disabled: bool,
    #[serde(default)]
    email_verified: bool,
    #[serde(default)]
    created_at: Value,
    #[serde(default)]
    last_login_at: Value,
    /// Custom claims serialized as a JSON string.
    custom_attributes: Option<String>,
}

impl UserInfo {
    fn custom_claims(&self) -> StoreResult<CustomClaims> {
        match self.custom_attributes.as_deref().map(str::trim) {
            None | Some("") => Ok(CustomClaims::new()),
            Some(raw) => {
                let claims: Option<CustomClaims> = serde_json::from_str(raw)?;
                Ok(claims.unwrap_or_default())
            }
        }
    }

    fn into_account(self, custom_claims: CustomClaims) -> Account {
        Account {
            uid: self.local_id,
            email: self.email,
            display_name: self.display_name,
            disabled: self.disabled,
            email_verified: self.email_verified,
            created_at: parse_timestamp(&self.created_at),
            last_sign_in_at: parse_timestamp(&self.last_login_at),
            custom_claims,
        }
    }

    /// Listing tolerates unreadable claims so one account cannot break a page.
    fn into_listed_account(self) -> Account {
        let custom_claims = self.custom_claims().unwrap_or_else(|e| {
            warn!(uid = %self.local_id, error = %e, "Unreadable custom claims");
            CustomClaims::new()
        });
        self.into_account(custom_claims)
    }
}

impl TryFrom<UserInfo> for Account {
    type Error = StoreError;

    fn try_from(user: UserInfo) -> StoreResult<Self> {
        let custom_claims = user.custom_claims()?;
        Ok(user.into_account(custom_claims))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchGetResponse {
    #[serde(default)]
    users: Vec<UserInfo>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<UserInfo>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest<'a> {
    local_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    disable_user: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom_attributes: Option<String>,
}

impl<'a> UpdateRequest<'a> {
    fn new(local_id: &'a str) -> Self {
        Self {
            local_id,
            email: None,
            display_name: None,
            disable_user: None,
            custom_attributes: None,
        }
    }
}

/// Identity Toolkit client for one project.
pub struct IdentityToolkitClient {
    http_client: reqwest::Client,
    tokens: Arc<dyn AccessTokenProvider>,
    base_url: String,
    project_id: String,
}

impl std::fmt::Debug for IdentityToolkitClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityToolkitClient")
            .field("base_url", &self.base_url)
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

impl IdentityToolkitClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Config` if the HTTP client cannot be created.
    pub fn new(
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> StoreResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| StoreError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            tokens,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            project_id: project_id.into(),
        })
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/v1/projects/{}/accounts:{action}",
            self.base_url, self.project_id
        )
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> StoreResult<T> {
        let token = self.tokens.access_token().await?;
        let response = request.bearer_auth(token).send().await?;
        let status = response.status();

        if status.is_success() {
            return response.json().await.map_err(StoreError::from);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiError>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);

        // Messages look like "USER_NOT_FOUND" or "USER_NOT_FOUND : detail".
        if message.starts_with(USER_NOT_FOUND) {
            return Err(StoreError::NotFound(message));
        }

        Err(StoreError::IdentityApi {
            status: status.as_u16(),
            message,
        })
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        action: &str,
        body: &B,
    ) -> StoreResult<T> {
        self.send(self.http_client.post(self.endpoint(action)).json(body))
            .await
    }
}

#[async_trait]
impl IdentityProvider for IdentityToolkitClient {
    #[instrument(skip(self))]
    async fn list_accounts(
        &self,
        page_size: u32,
        page_token: Option<&str>,
    ) -> StoreResult<AccountPage> {
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        let mut query: Vec<(&str, String)> = vec![("maxResults", page_size.to_string())];
        if let Some(token) = page_token.filter(|t| !t.is_empty()) {
            query.push(("nextPageToken", token.to_string()));
        }

        let page: BatchGetResponse = self
            .send(self.http_client.get(self.endpoint("batchGet")).query(&query))
            .await?;

        debug!(count = page.users.len(), "Fetched account page");

        Ok(AccountPage {
            accounts: page
                .users
                .into_iter()
                .map(UserInfo::into_listed_account)
                .collect(),
            next_page_token: page.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    #[instrument(skip(self))]
    async fn get_account(&self, uid: &str) -> StoreResult<Account> {
        let response: LookupResponse = self.post("lookup", &json!({ "localId": [uid] })).await?;

        let user = response
            .users
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(uid.to_string()))?;

        // Claims are merged on update; never hand back a partial set.
        Account::try_from(user)
    }

    #[instrument(skip(self, update))]
    async fn update_account(&self, uid: &str, update: &AccountUpdate) -> StoreResult<()> {
        let request = UpdateRequest {
            email: update.email.as_deref(),
            display_name: update.display_name.as_deref(),
            disable_user: update.disabled,
            ..UpdateRequest::new(uid)
        };
        let _: Value = self.post("update", &request).await?;
        Ok(())
    }

    #[instrument(skip(self, claims))]
    async fn set_custom_claims(&self, uid: &str, claims: &CustomClaims) -> StoreResult<()> {
        let request = UpdateRequest {
            custom_attributes: Some(serde_json::to_string(claims)?),
            ..UpdateRequest::new(uid)
        };
        let _: Value = self.post("update", &request).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_account(&self, uid: &str) -> StoreResult<()> {
        let _: Value = self.post("delete", &json!({ "localId": uid })).await?;
        Ok(())
    }
}
