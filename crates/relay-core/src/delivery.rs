//! Outbound reply delivery.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from delivering a reply.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// No Telegram connection is configured.
    #[error("Telegram is not connected")]
    NotConnected,

    /// The transport rejected the message.
    #[error("Failed to send message: {0}")]
    Failed(String),
}

/// Sends a text message to a contact.
#[async_trait]
pub trait ReplySender: Send + Sync {
    async fn send_text(&self, user_id: i64, text: &str) -> Result<(), DeliveryError>;
}
