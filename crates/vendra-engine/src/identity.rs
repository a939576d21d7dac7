//! Identity provider capability.
//!
//! An external provider (OAuth, SAML, ...) exchanges its own assertion for
//! a verified identity. The handshake itself is not this engine's concern;
//! whatever comes back here is treated as equivalent to a successful
//! password login minus the password check.

use thiserror::Error;

/// A verified identity produced by an external provider.
#[derive(Debug, Clone)]
pub struct ExternalIdentity {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Assertion exchange failure.
#[derive(Debug, Error)]
#[error("Identity provider rejected the assertion: {0}")]
pub struct IdentityError(pub String);

/// External identity provider capability.
pub trait IdentityProvider: Send + Sync {
    /// Exchanges a provider-specific assertion for a verified identity.
    fn exchange(&self, assertion: &str) -> Result<ExternalIdentity, IdentityError>;
}
