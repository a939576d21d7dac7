//! Error types for the engine's operation surface.
//!
//! Expected business failures are enum variants a transport can map to
//! status codes via [`ErrorKind`]. Unexpected storage faults are logged in
//! full server-side and collapse to [`EngineError::Internal`], which
//! deliberately carries no detail for the caller.

use thiserror::Error;
use tracing::error;

use vendra_core::{CoreError, ValidationError};
use vendra_db::DbError;

/// Engine operation errors.
#[derive(Debug, Error)]
pub enum EngineError {
    // -------------------------------------------------------------------------
    // Auth
    // -------------------------------------------------------------------------
    /// Lookup miss or password mismatch; the two are indistinguishable to
    /// the caller by design.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No refresh token was presented.
    #[error("No refresh token presented")]
    MissingToken,

    /// No account holds the presented refresh token.
    #[error("Refresh token not recognized")]
    TokenNotRecognized,

    /// Token failed signature/expiry verification or its subject disagrees
    /// with the stored session.
    #[error("Token failed verification")]
    TokenInvalid,

    /// Password-reset token is unknown, already used, or past its expiry.
    #[error("Reset token expired or invalid")]
    TokenExpiredOrInvalid,

    // -------------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------------
    #[error("No account found for {0}")]
    AccountNotFound(String),

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("No cart exists for account {0}")]
    CartNotFound(String),

    #[error("Product {0} is not in the cart")]
    ProductNotInCart(String),

    #[error("Invalid coupon: {0}")]
    InvalidCoupon(String),

    /// Generic storage-level lookup miss surfaced by a repository.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    // -------------------------------------------------------------------------
    // Checkout
    // -------------------------------------------------------------------------
    #[error("Unsupported payment method: {0}")]
    PaymentMethodUnsupported(String),

    #[error("Invalid order status: {0}")]
    InvalidStatus(String),

    // -------------------------------------------------------------------------
    // Input & conflicts
    // -------------------------------------------------------------------------
    #[error("{field} already exists")]
    Duplicate { field: String },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Core(#[from] CoreError),

    // -------------------------------------------------------------------------
    // Faults
    // -------------------------------------------------------------------------
    /// Storage/hashing/signing failure. Full detail is logged server-side;
    /// the caller only learns that something internal went wrong.
    #[error("Internal error")]
    Internal,
}

/// Coarse error categories a transport maps onto status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input (400-equivalent), not retried
    Validation,
    /// Authentication/authorization failure (401/403-equivalent)
    Auth,
    /// Referenced entity absent (404-equivalent)
    NotFound,
    /// Uniqueness conflict (409-equivalent)
    Conflict,
    /// Unexpected fault (500-equivalent), detail logged server-side only
    Internal,
}

impl EngineError {
    /// The taxonomy category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::InvalidCredentials
            | EngineError::MissingToken
            | EngineError::TokenNotRecognized
            | EngineError::TokenInvalid
            | EngineError::TokenExpiredOrInvalid => ErrorKind::Auth,

            EngineError::AccountNotFound(_)
            | EngineError::ProductNotFound(_)
            | EngineError::CartNotFound(_)
            | EngineError::ProductNotInCart(_)
            | EngineError::InvalidCoupon(_)
            | EngineError::NotFound { .. } => ErrorKind::NotFound,

            EngineError::PaymentMethodUnsupported(_)
            | EngineError::InvalidStatus(_)
            | EngineError::Validation(_)
            | EngineError::Core(_) => ErrorKind::Validation,

            EngineError::Duplicate { .. } => ErrorKind::Conflict,

            EngineError::Internal => ErrorKind::Internal,
        }
    }
}

/// Converts storage errors into engine errors.
///
/// Lookup misses and uniqueness conflicts are expected outcomes; everything
/// else is an internal fault, logged here with full detail and flattened so
/// nothing leaks to the caller.
impl From<DbError> for EngineError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => EngineError::NotFound { entity, id },

            DbError::UniqueViolation { field } => EngineError::Duplicate {
                // SQLite reports "table.column"; callers only care about the column
                field: field
                    .rsplit('.')
                    .next()
                    .unwrap_or(field.as_str())
                    .to_string(),
            },

            other => {
                error!(error = %other, "storage failure");
                EngineError::Internal
            }
        }
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Unit Tests
// =============================================================================
