//! # Account Repository
//!
//! Credential storage: lookups by id, email, refresh token, and reset-token
//! digest, plus the narrow mutations the session flows need. Nothing here
//! ever returns or logs a plaintext secret; the password hash travels only
//! to the verifier.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use vendra_core::Account;

/// Column list shared by every account SELECT.
const ACCOUNT_COLUMNS: &str = "id, email, first_name, last_name, mobile, password_hash, role, \
     blocked, refresh_token, reset_token_hash, reset_token_expires, created_at, updated_at";

/// Repository for account records.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: SqlitePool,
}

impl AccountRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AccountRepository { pool }
    }

    /// Inserts a new account. Duplicate email or mobile surfaces as
    /// [`DbError::UniqueViolation`] naming the violated column.
    pub async fn insert(&self, account: &Account) -> DbResult<()> {
        debug!(id = %account.id, "Inserting account");

        sqlx::query(
            r#"
            INSERT INTO accounts (
                id, email, first_name, last_name, mobile, password_hash,
                role, blocked, refresh_token, reset_token_hash,
                reset_token_expires, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&account.id)
        .bind(&account.email)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.mobile)
        .bind(&account.password_hash)
        .bind(account.role)
        .bind(account.blocked)
        .bind(&account.refresh_token)
        .bind(&account.reset_token_hash)
        .bind(account.reset_token_expires)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets an account by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    /// Gets an account by its unique email.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = ?1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    /// Gets the account holding the presented refresh token, if any.
    pub async fn get_by_refresh_token(&self, token: &str) -> DbResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE refresh_token = ?1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    /// Gets the account holding the given reset-token digest, if any.
    /// Expiry is checked by the caller, not here.
    pub async fn get_by_reset_digest(&self, digest: &str) -> DbResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE reset_token_hash = ?1"
        ))
        .bind(digest)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    /// Lists all accounts (admin read).
    pub async fn list(&self) -> DbResult<Vec<Account>> {
        let accounts = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(accounts)
    }

    /// Sets or clears the single active refresh token for an account.
    /// Overwriting an existing value is the "last login wins" behavior.
    pub async fn set_refresh_token(&self, id: &str, token: Option<&str>) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE accounts SET refresh_token = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(token)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Account", id));
        }

        Ok(())
    }

    /// Stores a reset-token digest and its expiry on the account.
    pub async fn set_reset_token(
        &self,
        id: &str,
        digest: &str,
        expires: DateTime<Utc>,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE accounts SET
                reset_token_hash = ?2,
                reset_token_expires = ?3,
                updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(digest)
        .bind(expires)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Account", id));
        }

        Ok(())
    }

    /// Sets a new password hash and clears any outstanding reset token in
    /// the same statement (reset tokens are single use).
    pub async fn reset_password(&self, id: &str, password_hash: &str) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE accounts SET
                password_hash = ?2,
                reset_token_hash = NULL,
                reset_token_expires = NULL,
                updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Account", id));
        }

        Ok(())
    }

    /// Replaces the password hash (change-password flow).
    pub async fn set_password_hash(&self, id: &str, password_hash: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE accounts SET password_hash = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(password_hash)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Account", id));
        }

        Ok(())
    }

    /// Flips the administrative block flag.
    pub async fn set_blocked(&self, id: &str, blocked: bool) -> DbResult<()> {
        debug!(id = %id, blocked = blocked, "Updating block flag");

        let result = sqlx::query(
            "UPDATE accounts SET blocked = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(blocked)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Account", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
