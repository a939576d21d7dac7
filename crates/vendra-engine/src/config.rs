//! Engine configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults suitable for development.

use serde::{Deserialize, Serialize};
use std::env;

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// SQLite database path
    pub database_path: String,

    /// Secret key for signing access and refresh tokens
    pub jwt_secret: String,

    /// Access token lifetime in seconds (default: 24 hours)
    pub access_token_ttl_secs: i64,

    /// Refresh token lifetime in seconds (default: 72 hours). Also the
    /// max-age of the client-side refresh credential.
    pub refresh_token_ttl_secs: i64,

    /// Password-reset token validity in minutes (default: 30)
    pub reset_token_ttl_mins: i64,

    /// Base URL embedded in password-reset notifications
    pub reset_link_base: String,
}

impl EngineConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = EngineConfig {
            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "./vendra.db".to_string()),

            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| {
                // Development fallback; in production this MUST be set
                "vendra-dev-secret-change-in-production".to_string()
            }),

            access_token_ttl_secs: env::var("ACCESS_TOKEN_TTL_SECS")
                .unwrap_or_else(|_| "86400".to_string()) // 24 hours
                .parse()
                .map_err(|_| ConfigError::InvalidValue("ACCESS_TOKEN_TTL_SECS".to_string()))?,

            refresh_token_ttl_secs: env::var("REFRESH_TOKEN_TTL_SECS")
                .unwrap_or_else(|_| "259200".to_string()) // 72 hours
                .parse()
                .map_err(|_| ConfigError::InvalidValue("REFRESH_TOKEN_TTL_SECS".to_string()))?,

            reset_token_ttl_mins: env::var("RESET_TOKEN_TTL_MINS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("RESET_TOKEN_TTL_MINS".to_string()))?,

            reset_link_base: env::var("RESET_LINK_BASE")
                .unwrap_or_else(|_| "http://localhost:8000/api/auth/reset-password".to_string()),
        };

        Ok(config)
    }

    /// Configuration for tests: fast constants, in-memory database marker.
    pub fn for_tests() -> Self {
        EngineConfig {
            database_path: ":memory:".to_string(),
            jwt_secret: "test-secret".to_string(),
            access_token_ttl_secs: 3600,
            refresh_token_ttl_secs: 7200,
            reset_token_ttl_mins: 30,
            reset_link_base: "http://localhost:8000/api/auth/reset-password".to_string(),
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
