//! Error types for the Telegram connection.

use thiserror::Error;

/// Errors that can occur talking to Telegram.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// Bot token not provided.
    #[error("Telegram bot token not set. Provide one or set TELEGRAM_BOT_TOKEN.")]
    NoToken,

    /// No bot is connected.
    #[error("Telegram is not connected")]
    NotConnected,

    /// Telegram rejected the token.
    #[error("Failed to validate bot token: {0}")]
    ValidationFailed(String),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for Telegram operations.
pub type Result<T> = std::result::Result<T, TelegramError>;
