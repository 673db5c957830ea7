//! Application configuration loaded from environment variables.
//!
//! Loading is fail-fast: required variables must be present and valid, or
//! the server exits with a clear error message before binding.

use sensorhub_auth::FIREBASE_JWKS_URL;
use sensorhub_store::IDENTITY_TOOLKIT_URL;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

use crate::logging::DEFAULT_FILTER;

/// Configuration errors that can occur during environment loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    #[error("Failed to parse port: {0}")]
    InvalidPort(#[from] std::num::ParseIntError),
}

/// How the server authenticates to the identity service and the database.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Service-account key file exchanged for short-lived access tokens.
    ServiceAccountFile(PathBuf),

    /// Fixed bearer token, typically for emulators.
    StaticToken(String),
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ServiceAccountFile(path) => {
                f.debug_tuple("ServiceAccountFile").field(path).finish()
            }
            Self::StaticToken(_) => f.write_str("StaticToken([REDACTED])"),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Firebase project id; also the expected ID token audience.
    pub project_id: String,

    /// Realtime Database root URL.
    pub database_url: String,

    pub credentials: Credentials,

    pub identity_toolkit_url: String,

    /// Where the ID token signing keys are published.
    pub jwks_url: String,

    pub host: String,
    pub port: u16,

    /// Log filter directive.
    pub rust_log: String,

    /// Allowed CORS origins; `["*"]` allows any.
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env.local` file is loaded first when present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values are
    /// invalid.
    ///
    /// # Required Variables
    ///
    /// - `FIREBASE_PROJECT_ID`
    /// - `FIREBASE_DB_URL`
    /// - `GOOGLE_APPLICATION_CREDENTIALS`, unless `FIREBASE_ACCESS_TOKEN` is set
    ///
    /// # Optional Variables
    ///
    /// - `FIREBASE_ACCESS_TOKEN` - Static bearer token (takes precedence)
    /// - `IDENTITY_TOOLKIT_URL` - Identity service base URL
    /// - `FIREBASE_JWKS_URL` - ID token signing keys
    /// - `HOST` - Bind address (default: "0.0.0.0")
    /// - `PORT` - Listen port (default: 8000)
    /// - `RUST_LOG` - Log filter (default: "info,sensorhub=debug")
    /// - `CORS_ALLOWED_ORIGINS` - Comma-separated origins (default: "*")
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::from_filename(".env.local");
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// See [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required =
            |name: &str| var(name).ok_or_else(|| ConfigError::MissingVar(name.to_string()));

        let project_id = required("FIREBASE_PROJECT_ID")?;

        let database_url = required("FIREBASE_DB_URL")?;
        if !database_url.starts_with("http://") && !database_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                var: "FIREBASE_DB_URL".to_string(),
                message: "Must be an http(s) URL".to_string(),
            });
        }

        let credentials = match var("FIREBASE_ACCESS_TOKEN") {
            Some(token) => Credentials::StaticToken(token),
            None => var("GOOGLE_APPLICATION_CREDENTIALS")
                .map(|path| Credentials::ServiceAccountFile(PathBuf::from(path)))
                .ok_or_else(|| {
                    ConfigError::MissingVar("GOOGLE_APPLICATION_CREDENTIALS".to_string())
                })?,
        };

        let identity_toolkit_url =
            var("IDENTITY_TOOLKIT_URL").unwrap_or_else(|| IDENTITY_TOOLKIT_URL.to_string());
        let jwks_url = var("FIREBASE_JWKS_URL").unwrap_or_else(|| FIREBASE_JWKS_URL.to_string());

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = var("PORT")
            .unwrap_or_else(|| "8000".to_string())
            .trim()
            .parse()?;
        if port == 0 {
            return Err(ConfigError::InvalidValue {
                var: "PORT".to_string(),
                message: "Port must be between 1 and 65535".to_string(),
            });
        }

        let rust_log = var("RUST_LOG").unwrap_or_else(|| DEFAULT_FILTER.to_string());

        let cors_origins: Vec<String> = var("CORS_ALLOWED_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec!["*".to_string()]);
        if cors_origins.is_empty() {
            return Err(ConfigError::InvalidValue {
                var: "CORS_ALLOWED_ORIGINS".to_string(),
                message: "At least one origin is required".to_string(),
            });
        }

        Ok(Self {
            project_id,
            database_url,
            credentials,
            identity_toolkit_url,
            jwks_url,
            host,
            port,
            rust_log,
            cors_origins,
        })
    }

    /// Socket address string for binding.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether any origin may call the API.
    #[must_use]
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}
