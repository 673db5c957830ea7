//! Error types for the admin API.
//!
//! Every error renders as a single-key JSON object naming its kind, e.g.
//! `{"serviceFailure": "Failed to fetch users: ..."}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{Map, Value};

/// Error type for the admin API.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AdminApiError {
    /// Missing or invalid bearer token.
    #[error("{0}")]
    Unauthorized(String),

    /// Valid token without the admin claim.
    #[error("{0}")]
    Forbidden(String),

    /// The requested entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The request body could not be parsed.
    #[error("{0}")]
    InvalidRequest(String),

    /// The identity service or the database failed.
    #[error("{0}")]
    ServiceFailure(String),
}

impl AdminApiError {
    /// Wrap a collaborator error as a service failure for `operation`,
    /// e.g. `"fetch users"` yields `"Failed to fetch users: <err>"`.
    pub fn service(operation: &str, err: impl std::fmt::Display) -> Self {
        AdminApiError::ServiceFailure(format!("Failed to {operation}: {err}"))
    }

    /// JSON key naming the error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            AdminApiError::Unauthorized(_) | AdminApiError::Forbidden(_) => "authFailure",
            AdminApiError::NotFound(_) => "notFound",
            AdminApiError::InvalidRequest(_) => "invalidRequest",
            AdminApiError::ServiceFailure(_) => "serviceFailure",
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            AdminApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AdminApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            AdminApiError::NotFound(_) => StatusCode::NOT_FOUND,
            AdminApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AdminApiError::ServiceFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AdminApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Admin request failed");
        }
        let mut body = Map::new();
        body.insert(self.kind().to_string(), Value::String(self.to_string()));
        (status, Json(Value::Object(body))).into_response()
    }
}
