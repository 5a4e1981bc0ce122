//! Outgoing mail transports
//!
//! - [`smtp`]: lettre-backed SMTP delivery
//! - [`memory`]: in-memory transport for dry runs and tests

use crate::error::Result;
use serde::Serialize;

pub mod memory;
pub mod smtp;

pub use memory::RecordingTransport;
pub use smtp::SmtpTransport;

/// A fully rendered message ready for delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// What the transport reported for a delivered message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransportReceipt {
    /// Server response, e.g. "250 2.0.0 OK queued"
    pub response: String,
}

/// Delivers one message per call
///
/// Implementations hold their session (connection settings, credentials)
/// for their whole lifetime; `send` never reconfigures it.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait EmailTransport: Send + Sync {
    /// Deliver `message`
    ///
    /// # Errors
    /// Any delivery failure (connection, authentication, rejected recipient,
    /// invalid address) is reported as [`crate::MailerError::Transport`].
    async fn send(&self, message: OutgoingMessage) -> Result<TransportReceipt>;
}
