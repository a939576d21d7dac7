//! JWT token module.
//!
//! Mints and verifies the two token kinds independently of storage:
//! short-lived access tokens carrying the account id and role, and
//! longer-lived refresh tokens. A `token_type` claim keeps the two from
//! being substituted for each other.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use vendra_core::AccountRole;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account id)
    pub sub: String,

    /// Account role ("customer" | "admin")
    pub role: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,

    /// Token type ("access" or "refresh")
    pub token_type: String,
}

/// Identity derived from a verified access token.
///
/// Self-scoped operations take this, never a client-supplied account id.
#[derive(Debug, Clone)]
pub struct CallerIdentity {
    pub account_id: String,
    pub role: AccountRole,
}

/// JWT token manager.
pub struct JwtManager {
    secret: String,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager.
    pub fn new(secret: String, access_ttl_secs: i64, refresh_ttl_secs: i64) -> Self {
        JwtManager {
            secret,
            access_ttl_secs,
            refresh_ttl_secs,
        }
    }

    /// Mint an access token for an account.
    pub fn mint_access_token(&self, account_id: &str, role: AccountRole) -> EngineResult<String> {
        self.mint(account_id, role, "access", self.access_ttl_secs)
    }

    /// Mint a refresh token for an account.
    pub fn mint_refresh_token(&self, account_id: &str, role: AccountRole) -> EngineResult<String> {
        self.mint(account_id, role, "refresh", self.refresh_ttl_secs)
    }

    fn mint(
        &self,
        account_id: &str,
        role: AccountRole,
        token_type: &str,
        ttl_secs: i64,
    ) -> EngineResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(ttl_secs);

        let claims = Claims {
            sub: account_id.to_string(),
            role: role.as_str().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: token_type.to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| {
            tracing::error!(error = %e, "token signing failed");
            EngineError::Internal
        })
    }

    /// Validate and decode a token of either kind.
    pub fn validate_token(&self, token: &str) -> EngineResult<Claims> {
        let validation = Validation::default();

        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|_| EngineError::TokenInvalid)?;

        Ok(token_data.claims)
    }

    /// Validate that a token is an access token.
    pub fn validate_access_token(&self, token: &str) -> EngineResult<Claims> {
        let claims = self.validate_token(token)?;

        if claims.token_type != "access" {
            return Err(EngineError::TokenInvalid);
        }

        Ok(claims)
    }

    /// Validate that a token is a refresh token.
    pub fn validate_refresh_token(&self, token: &str) -> EngineResult<Claims> {
        let claims = self.validate_token(token)?;

        if claims.token_type != "refresh" {
            return Err(EngineError::TokenInvalid);
        }

        Ok(claims)
    }

    /// Derive the caller identity from an Authorization header.
    ///
    /// This is the only sanctioned path from a request to an account id for
    /// self-scoped operations.
    pub fn authenticate(&self, auth_header: Option<&str>) -> EngineResult<CallerIdentity> {
        let header = auth_header.ok_or(EngineError::MissingToken)?;
        let token = extract_bearer_token(header).ok_or(EngineError::TokenInvalid)?;
        let claims = self.validate_access_token(token)?;
        let role = AccountRole::parse(&claims.role).ok_or(EngineError::TokenInvalid)?;

        Ok(CallerIdentity {
            account_id: claims.sub,
            role,
        })
    }
}

/// Extract bearer token from an authorization header value.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}
