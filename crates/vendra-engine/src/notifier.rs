//! Notifier capability.
//!
//! Fire-and-forget outbound notifications (password-reset emails). Delivery
//! mechanics live behind the trait; the engine never propagates a send
//! failure to the caller - it logs and moves on.

use thiserror::Error;
use tracing::info;

/// Notification dispatch failure.
#[derive(Debug, Error)]
#[error("Notification dispatch failed: {0}")]
pub struct NotifyError(pub String);

/// Outbound notification capability.
pub trait Notifier: Send + Sync {
    /// Dispatches a message. Implementations should return quickly;
    /// queueing and retries are their concern.
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Default notifier: writes the outgoing message to the log. Useful in
/// development and as a stand-in wherever real delivery is not wired up.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, to: &str, subject: &str, _body: &str) -> Result<(), NotifyError> {
        info!(to = %to, subject = %subject, "Dispatching notification");
        Ok(())
    }
}
