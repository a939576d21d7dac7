//! Session service: the authentication lifecycle.
//!
//! Owns login, token refresh, logout, password reset request/confirm,
//! password change, registration, federated login, and the administrative
//! block toggles. Composes the credential store, the password hasher, the
//! token issuer, and the notifier capability.
//!
//! ## Session model
//! One active session per account: login stores the newly minted refresh
//! token on the account, overwriting any previous value - the last login
//! wins. Refresh mints a new access token only; the refresh token itself is
//! not rotated, so it stays valid until logout or the next login replaces
//! it.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::identity::{ExternalIdentity, IdentityProvider};
use crate::password::PasswordHasher;
use crate::reset;
use crate::token::JwtManager;
use crate::AppState;
use vendra_core::{validation, Account, AccountProfile, AccountRole};

// =============================================================================
// Request / Response Types
// =============================================================================

/// The client-side refresh credential: an HTTP-only persistent cookie in an
/// HTTP binding. The engine only describes it; setting and clearing it is
/// the transport's job.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshCredential {
    /// The refresh token value. Must not be readable from script.
    pub value: String,

    /// Credential lifetime in seconds.
    pub max_age_secs: i64,

    /// Always true: the client must not expose the value to script.
    pub http_only: bool,
}

impl RefreshCredential {
    fn new(value: String, max_age_secs: i64) -> Self {
        RefreshCredential {
            value,
            max_age_secs,
            http_only: true,
        }
    }
}

/// Successful login result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Profile subset of the account; never includes the password hash.
    pub profile: AccountProfile,

    /// Short-lived access token (claims: account id, role).
    pub access_token: String,

    /// Longer-lived refresh credential for the client to persist.
    #[serde(skip)]
    pub refresh_credential: RefreshCredential,
}

/// Successful refresh result: a new access token only.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

/// Logout result. In both cases the transport clears the client-side
/// refresh credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    /// The stored session was found and cleared.
    SessionCleared,

    /// No account held the presented token. Non-fatal: reported as an
    /// access-denied outcome, and the client credential is cleared anyway.
    UnknownSession,
}

/// Password-change result. `SameAsCurrent` is a user-visible outcome, not
/// an error: the stored hash is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordChangeOutcome {
    Updated,
    SameAsCurrent,
}

/// Password-reset request result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetRequested {
    /// The plaintext reset token. It is dispatched to the account's email
    /// via the notifier AND returned here for same-process convenience;
    /// see DESIGN.md for the tradeoff.
    pub token: String,
}

/// Registration input.
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub mobile: String,
    pub password: String,
}

// =============================================================================
// Session Service
// =============================================================================

/// Authentication lifecycle service.
pub struct SessionService {
    state: Arc<AppState>,
    jwt: JwtManager,
    hasher: PasswordHasher,
}

impl SessionService {
    /// Create a new session service.
    pub fn new(state: Arc<AppState>) -> Self {
        let jwt = JwtManager::new(
            state.config.jwt_secret.clone(),
            state.config.access_token_ttl_secs,
            state.config.refresh_token_ttl_secs,
        );

        SessionService {
            state,
            jwt,
            hasher: PasswordHasher::new(),
        }
    }

    /// The token manager, for transports that need to authenticate
    /// incoming requests against issued access tokens.
    pub fn tokens(&self) -> &JwtManager {
        &self.jwt
    }

    // -------------------------------------------------------------------------
    // Login / Refresh / Logout
    // -------------------------------------------------------------------------

    /// Verifies credentials and opens a session.
    ///
    /// A lookup miss and a hash mismatch both cost one hashing round and
    /// both report `InvalidCredentials`, so response timing does not reveal
    /// which of the two happened.
    ///
    /// Note: `blocked` is not consulted here - a blocked account can still
    /// log in (see DESIGN.md before changing this).
    pub async fn login(&self, email: &str, password: &str) -> EngineResult<LoginResponse> {
        validation::validate_email(email)?;

        let Some(account) = self.state.db.accounts().get_by_email(email).await? else {
            self.hasher.burn(password.to_string()).await?;
            return Err(EngineError::InvalidCredentials);
        };

        let matches = self
            .hasher
            .verify(password.to_string(), account.password_hash.clone())
            .await?;
        if !matches {
            return Err(EngineError::InvalidCredentials);
        }

        self.open_session(account).await
    }

    /// Opens a session for an already-verified account: mints the token
    /// pair and persists the refresh token (overwriting any prior one).
    async fn open_session(&self, account: Account) -> EngineResult<LoginResponse> {
        let access_token = self.jwt.mint_access_token(&account.id, account.role)?;
        let refresh_token = self.jwt.mint_refresh_token(&account.id, account.role)?;

        self.state
            .db
            .accounts()
            .set_refresh_token(&account.id, Some(&refresh_token))
            .await?;

        info!(account_id = %account.id, "Login successful");

        Ok(LoginResponse {
            profile: account.profile(),
            access_token,
            refresh_credential: RefreshCredential::new(
                refresh_token,
                self.state.config.refresh_token_ttl_secs,
            ),
        })
    }

    /// Exchanges a refresh token for a new access token.
    ///
    /// The presented value must both be stored on an account and verify as
    /// a refresh token whose subject is that same account. The refresh
    /// token is NOT rotated here.
    pub async fn refresh(&self, presented: Option<&str>) -> EngineResult<RefreshResponse> {
        let token = presented.ok_or(EngineError::MissingToken)?;

        let account = self
            .state
            .db
            .accounts()
            .get_by_refresh_token(token)
            .await?
            .ok_or(EngineError::TokenNotRecognized)?;

        let claims = self.jwt.validate_refresh_token(token)?;
        if claims.sub != account.id {
            warn!(account_id = %account.id, "Refresh token subject mismatch");
            return Err(EngineError::TokenInvalid);
        }

        let access_token = self.jwt.mint_access_token(&account.id, account.role)?;

        info!(account_id = %account.id, "Access token refreshed");

        Ok(RefreshResponse { access_token })
    }

    /// Ends a session. Idempotent: a second call with the same token (now
    /// cleared) reports `UnknownSession`, and the client credential is
    /// cleared in either case.
    pub async fn logout(&self, presented: Option<&str>) -> EngineResult<LogoutOutcome> {
        let token = presented.ok_or(EngineError::MissingToken)?;

        let Some(account) = self.state.db.accounts().get_by_refresh_token(token).await? else {
            return Ok(LogoutOutcome::UnknownSession);
        };

        self.state
            .db
            .accounts()
            .set_refresh_token(&account.id, None)
            .await?;

        info!(account_id = %account.id, "Logout successful");

        Ok(LogoutOutcome::SessionCleared)
    }

    // -------------------------------------------------------------------------
    // Password Reset / Change
    // -------------------------------------------------------------------------

    /// Issues a password-reset token for the account behind `email`.
    ///
    /// Only the token's digest and an expiry (now + configured TTL) are
    /// persisted. The plaintext goes out via the notifier; dispatch failure
    /// is logged, never propagated.
    pub async fn request_password_reset(
        &self,
        email: &str,
    ) -> EngineResult<PasswordResetRequested> {
        let account = self
            .state
            .db
            .accounts()
            .get_by_email(email)
            .await?
            .ok_or_else(|| EngineError::AccountNotFound(email.to_string()))?;

        let token = reset::generate_token();
        let expires = Utc::now() + Duration::minutes(self.state.config.reset_token_ttl_mins);

        self.state
            .db
            .accounts()
            .set_reset_token(&account.id, &reset::digest(&token), expires)
            .await?;

        let body = format!(
            "Hi, please follow this link to reset your password. The link is \
             valid for the next {} minutes: {}/{}",
            self.state.config.reset_token_ttl_mins, self.state.config.reset_link_base, token
        );
        if let Err(err) = self
            .state
            .notifier
            .send(&account.email, "Forgot Password Link", &body)
        {
            warn!(account_id = %account.id, error = %err, "Reset notification failed");
        }

        info!(account_id = %account.id, "Password reset requested");

        Ok(PasswordResetRequested { token })
    }

    /// Confirms a password reset with the plaintext token.
    ///
    /// The token is single use: a successful confirmation clears the stored
    /// digest, so presenting the same token again fails.
    pub async fn confirm_password_reset(
        &self,
        token: &str,
        new_password: &str,
    ) -> EngineResult<()> {
        validation::validate_password(new_password)?;

        let account = self
            .state
            .db
            .accounts()
            .get_by_reset_digest(&reset::digest(token))
            .await?
            .ok_or(EngineError::TokenExpiredOrInvalid)?;

        let expires = account
            .reset_token_expires
            .ok_or(EngineError::TokenExpiredOrInvalid)?;
        if expires <= Utc::now() {
            return Err(EngineError::TokenExpiredOrInvalid);
        }

        let hash = self.hasher.hash(new_password.to_string()).await?;
        self.state
            .db
            .accounts()
            .reset_password(&account.id, &hash)
            .await?;

        info!(account_id = %account.id, "Password reset confirmed");

        Ok(())
    }

    /// Changes the password for an authenticated account.
    ///
    /// A candidate equal to the current password is reported as
    /// `SameAsCurrent` and leaves the stored hash untouched.
    pub async fn change_password(
        &self,
        account_id: &str,
        candidate: &str,
    ) -> EngineResult<PasswordChangeOutcome> {
        validation::validate_password(candidate)?;

        let account = self
            .state
            .db
            .accounts()
            .get_by_id(account_id)
            .await?
            .ok_or_else(|| EngineError::AccountNotFound(account_id.to_string()))?;

        let same = self
            .hasher
            .verify(candidate.to_string(), account.password_hash.clone())
            .await?;
        if same {
            return Ok(PasswordChangeOutcome::SameAsCurrent);
        }

        let hash = self.hasher.hash(candidate.to_string()).await?;
        self.state
            .db
            .accounts()
            .set_password_hash(&account.id, &hash)
            .await?;

        info!(account_id = %account.id, "Password changed");

        Ok(PasswordChangeOutcome::Updated)
    }

    // -------------------------------------------------------------------------
    // Registration / Federated Login
    // -------------------------------------------------------------------------

    /// Registers a new customer account. Duplicate email or mobile surfaces
    /// as a conflict.
    pub async fn register(&self, request: RegisterRequest) -> EngineResult<AccountProfile> {
        validation::validate_email(&request.email)?;
        validation::validate_mobile(&request.mobile)?;
        validation::validate_name("first_name", &request.first_name)?;
        validation::validate_name("last_name", &request.last_name)?;
        validation::validate_password(&request.password)?;

        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4().to_string(),
            email: request.email.trim().to_string(),
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            mobile: request.mobile.trim().to_string(),
            password_hash: self.hasher.hash(request.password).await?,
            role: AccountRole::Customer,
            blocked: false,
            refresh_token: None,
            reset_token_hash: None,
            reset_token_expires: None,
            created_at: now,
            updated_at: now,
        };

        self.state.db.accounts().insert(&account).await?;

        info!(account_id = %account.id, "Account registered");

        Ok(account.profile())
    }

    /// Logs in via an external identity provider: the provider's verified
    /// identity stands in for the password check; everything else matches a
    /// password login.
    pub async fn login_federated(
        &self,
        provider: &dyn IdentityProvider,
        assertion: &str,
    ) -> EngineResult<LoginResponse> {
        let identity: ExternalIdentity = provider.exchange(assertion).map_err(|err| {
            warn!(error = %err, "Identity assertion rejected");
            EngineError::InvalidCredentials
        })?;

        let account = self
            .state
            .db
            .accounts()
            .get_by_email(&identity.email)
            .await?
            .ok_or_else(|| EngineError::AccountNotFound(identity.email.clone()))?;

        self.open_session(account).await
    }

    // -------------------------------------------------------------------------
    // Administration
    // -------------------------------------------------------------------------

    /// Blocks an account. Pure state flip; does not end an open session and
    /// does not (currently) gate login.
    pub async fn block_account(&self, account_id: &str) -> EngineResult<()> {
        self.set_blocked(account_id, true).await
    }

    /// Unblocks an account.
    pub async fn unblock_account(&self, account_id: &str) -> EngineResult<()> {
        self.set_blocked(account_id, false).await
    }

    async fn set_blocked(&self, account_id: &str, blocked: bool) -> EngineResult<()> {
        self.state
            .db
            .accounts()
            .set_blocked(account_id, blocked)
            .await
            .map_err(|err| match err {
                vendra_db::DbError::NotFound { .. } => {
                    EngineError::AccountNotFound(account_id.to_string())
                }
                other => other.into(),
            })?;

        info!(account_id = %account_id, blocked = blocked, "Block flag updated");
        Ok(())
    }

    /// Admin read: one account's profile.
    pub async fn get_account(&self, account_id: &str) -> EngineResult<AccountProfile> {
        let account = self
            .state
            .db
            .accounts()
            .get_by_id(account_id)
            .await?
            .ok_or_else(|| EngineError::AccountNotFound(account_id.to_string()))?;

        Ok(account.profile())
    }

    /// Admin read: all account profiles.
    pub async fn list_accounts(&self) -> EngineResult<Vec<AccountProfile>> {
        let accounts = self.state.db.accounts().list().await?;
        Ok(accounts.iter().map(Account::profile).collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::IdentityError;
    use crate::testing;

    fn register_request(email: &str, mobile: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            first_name: "Jo".to_string(),
            last_name: "Doe".to_string(),
            mobile: mobile.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_then_refresh_roundtrip() {
        let state = testing::state().await;
        let sessions = SessionService::new(state);

        sessions
            .register(register_request("jo@example.com", "555123456", "hunter2hunter2"))
            .await
            .unwrap();

        let login = sessions.login("jo@example.com", "hunter2hunter2").await.unwrap();
        assert_eq!(login.profile.email, "jo@example.com");
        assert!(login.refresh_credential.http_only);

        let refreshed = sessions
            .refresh(Some(&login.refresh_credential.value))
            .await
            .unwrap();

        // The new access token verifies against the same account id
        let claims = sessions
            .tokens()
            .validate_access_token(&refreshed.access_token)
            .unwrap();
        assert_eq!(claims.sub, login.profile.id);
    }

    #[tokio::test]
    async fn test_login_failures_are_uniform() {
        let state = testing::state().await;
        let sessions = SessionService::new(state);

        sessions
            .register(register_request("jo@example.com", "555123456", "hunter2hunter2"))
            .await
            .unwrap();

        // Wrong password and unknown email report the same failure
        let err = sessions
            .login("jo@example.com", "wrong-password")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidCredentials));

        let err = sessions
            .login("nobody@example.com", "hunter2hunter2")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_logout_then_refresh_fails() {
        let state = testing::state().await;
        let sessions = SessionService::new(state);

        sessions
            .register(register_request("jo@example.com", "555123456", "hunter2hunter2"))
            .await
            .unwrap();
        let login = sessions.login("jo@example.com", "hunter2hunter2").await.unwrap();
        let token = login.refresh_credential.value;

        let outcome = sessions.logout(Some(&token)).await.unwrap();
        assert_eq!(outcome, LogoutOutcome::SessionCleared);

        // The cleared token no longer refreshes
        let err = sessions.refresh(Some(&token)).await.unwrap_err();
        assert!(matches!(err, EngineError::TokenNotRecognized));

        // Logout is idempotent: second call is the non-fatal unknown case
        let outcome = sessions.logout(Some(&token)).await.unwrap();
        assert_eq!(outcome, LogoutOutcome::UnknownSession);

        // Missing token is its own failure
        let err = sessions.logout(None).await.unwrap_err();
        assert!(matches!(err, EngineError::MissingToken));
    }

    #[tokio::test]
    async fn test_second_login_invalidates_previous_session() {
        let state = testing::state().await;
        let sessions = SessionService::new(state);

        sessions
            .register(register_request("jo@example.com", "555123456", "hunter2hunter2"))
            .await
            .unwrap();

        let first = sessions.login("jo@example.com", "hunter2hunter2").await.unwrap();
        let second = sessions.login("jo@example.com", "hunter2hunter2").await.unwrap();

        // Last login wins: the first refresh token was overwritten
        let err = sessions
            .refresh(Some(&first.refresh_credential.value))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::TokenNotRecognized));

        sessions
            .refresh(Some(&second.refresh_credential.value))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_refresh_rejects_unverifiable_stored_token() {
        let state = testing::state().await;
        let sessions = SessionService::new(state.clone());

        let profile = sessions
            .register(register_request("jo@example.com", "555123456", "hunter2hunter2"))
            .await
            .unwrap();

        // A stored value that is not a valid refresh JWT fails verification
        state
            .db
            .accounts()
            .set_refresh_token(&profile.id, Some("not-a-jwt"))
            .await
            .unwrap();
        let err = sessions.refresh(Some("not-a-jwt")).await.unwrap_err();
        assert!(matches!(err, EngineError::TokenInvalid));

        // A valid refresh token for a DIFFERENT subject also fails
        let foreign = sessions
            .tokens()
            .mint_refresh_token("someone-else", vendra_core::AccountRole::Customer)
            .unwrap();
        state
            .db
            .accounts()
            .set_refresh_token(&profile.id, Some(&foreign))
            .await
            .unwrap();
        let err = sessions.refresh(Some(&foreign)).await.unwrap_err();
        assert!(matches!(err, EngineError::TokenInvalid));

        let err = sessions.refresh(None).await.unwrap_err();
        assert!(matches!(err, EngineError::MissingToken));
    }

    #[tokio::test]
    async fn test_password_reset_flow() {
        let notifier = std::sync::Arc::new(testing::RecordingNotifier::default());
        let state = testing::state_with_notifier(notifier.clone()).await;
        let sessions = SessionService::new(state);

        sessions
            .register(register_request("jo@example.com", "555123456", "hunter2hunter2"))
            .await
            .unwrap();

        let requested = sessions
            .request_password_reset("jo@example.com")
            .await
            .unwrap();

        // The plaintext token went out via the notifier
        {
            let sent = notifier.sent.lock().unwrap();
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].0, "jo@example.com");
            assert!(sent[0].2.contains(&requested.token));
        }

        sessions
            .confirm_password_reset(&requested.token, "new-password-1")
            .await
            .unwrap();

        // New password works, old one does not
        sessions.login("jo@example.com", "new-password-1").await.unwrap();
        assert!(sessions
            .login("jo@example.com", "hunter2hunter2")
            .await
            .is_err());

        // Single use: the same token fails the second time
        let err = sessions
            .confirm_password_reset(&requested.token, "another-pass-2")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::TokenExpiredOrInvalid));
    }

    #[tokio::test]
    async fn test_password_reset_expiry() {
        let state = testing::state().await;
        let sessions = SessionService::new(state.clone());

        let profile = sessions
            .register(register_request("jo@example.com", "555123456", "hunter2hunter2"))
            .await
            .unwrap();

        let requested = sessions
            .request_password_reset("jo@example.com")
            .await
            .unwrap();

        // Simulate the clock passing the 30-minute window
        state
            .db
            .accounts()
            .set_reset_token(
                &profile.id,
                &crate::reset::digest(&requested.token),
                Utc::now() - Duration::minutes(1),
            )
            .await
            .unwrap();

        let err = sessions
            .confirm_password_reset(&requested.token, "new-password-1")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::TokenExpiredOrInvalid));
    }

    #[tokio::test]
    async fn test_password_reset_unknown_email() {
        let state = testing::state().await;
        let sessions = SessionService::new(state);

        let err = sessions
            .request_password_reset("nobody@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::AccountNotFound(_)));

        let err = sessions
            .confirm_password_reset("bogus-token", "new-password-1")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::TokenExpiredOrInvalid));
    }

    #[tokio::test]
    async fn test_change_password_same_is_not_an_error() {
        let state = testing::state().await;
        let sessions = SessionService::new(state.clone());

        let profile = sessions
            .register(register_request("jo@example.com", "555123456", "hunter2hunter2"))
            .await
            .unwrap();
        let before = state
            .db
            .accounts()
            .get_by_id(&profile.id)
            .await
            .unwrap()
            .unwrap()
            .password_hash;

        let outcome = sessions
            .change_password(&profile.id, "hunter2hunter2")
            .await
            .unwrap();
        assert_eq!(outcome, PasswordChangeOutcome::SameAsCurrent);

        // Stored hash untouched
        let after = state
            .db
            .accounts()
            .get_by_id(&profile.id)
            .await
            .unwrap()
            .unwrap()
            .password_hash;
        assert_eq!(before, after);

        let outcome = sessions
            .change_password(&profile.id, "a-different-one")
            .await
            .unwrap();
        assert_eq!(outcome, PasswordChangeOutcome::Updated);
        sessions.login("jo@example.com", "a-different-one").await.unwrap();
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let state = testing::state().await;
        let sessions = SessionService::new(state);

        sessions
            .register(register_request("jo@example.com", "555123456", "hunter2hunter2"))
            .await
            .unwrap();

        let err = sessions
            .register(register_request("jo@example.com", "555999999", "hunter2hunter2"))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Duplicate { ref field } if field == "email"));

        let err = sessions
            .register(register_request("bad-email", "555999999", "hunter2hunter2"))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn test_blocked_account_can_still_login() {
        let state = testing::state().await;
        let sessions = SessionService::new(state.clone());

        let profile = sessions
            .register(register_request("jo@example.com", "555123456", "hunter2hunter2"))
            .await
            .unwrap();

        sessions.block_account(&profile.id).await.unwrap();
        assert!(state
            .db
            .accounts()
            .get_by_id(&profile.id)
            .await
            .unwrap()
            .unwrap()
            .blocked);

        // Blocking does not gate login
        sessions.login("jo@example.com", "hunter2hunter2").await.unwrap();

        sessions.unblock_account(&profile.id).await.unwrap();
        let err = sessions.block_account("missing").await.unwrap_err();
        assert!(matches!(err, EngineError::AccountNotFound(_)));
    }

    struct StubProvider;

    impl IdentityProvider for StubProvider {
        fn exchange(&self, assertion: &str) -> Result<ExternalIdentity, IdentityError> {
            if assertion == "good-assertion" {
                Ok(ExternalIdentity {
                    email: "jo@example.com".to_string(),
                    first_name: Some("Jo".to_string()),
                    last_name: None,
                })
            } else {
                Err(IdentityError("unknown assertion".to_string()))
            }
        }
    }

    #[tokio::test]
    async fn test_federated_login() {
        let state = testing::state().await;
        let sessions = SessionService::new(state);

        sessions
            .register(register_request("jo@example.com", "555123456", "hunter2hunter2"))
            .await
            .unwrap();

        let login = sessions
            .login_federated(&StubProvider, "good-assertion")
            .await
            .unwrap();
        assert_eq!(login.profile.email, "jo@example.com");
        // The issued pair behaves like a password login's
        sessions
            .refresh(Some(&login.refresh_credential.value))
            .await
            .unwrap();

        let err = sessions
            .login_federated(&StubProvider, "bad-assertion")
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_admin_reads() {
        let state = testing::state().await;
        let sessions = SessionService::new(state);

        let profile = sessions
            .register(register_request("jo@example.com", "555123456", "hunter2hunter2"))
            .await
            .unwrap();

        let fetched = sessions.get_account(&profile.id).await.unwrap();
        assert_eq!(fetched.email, "jo@example.com");

        let all = sessions.list_accounts().await.unwrap();
        assert_eq!(all.len(), 1);

        let err = sessions.get_account("missing").await.unwrap_err();
        assert!(matches!(err, EngineError::AccountNotFound(_)));
    }
}
