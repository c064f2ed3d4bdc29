//! Outbound mail. The only way this service sends email.
//!
//! Constructed once at startup and health-checked before the server binds. The
//! intake pipeline and the code verifier share it as `Arc<dyn Notifier>`.

pub mod smtp;
pub mod templates;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Invalid address '{address}': {reason}")]
    Address { address: String, reason: String },

    #[error("Message could not be built: {0}")]
    Build(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Transport did not respond within {0:?}")]
    Timeout(std::time::Duration),
}

/// File attached to an outbound message.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// A structured message; delivery either succeeds or raises `NotifyError`.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub attachment: Option<Attachment>,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: OutboundMessage) -> Result<(), NotifyError>;

    /// Confirms the transport is reachable and accepts our credentials.
    async fn health_check(&self) -> Result<(), NotifyError>;
}
