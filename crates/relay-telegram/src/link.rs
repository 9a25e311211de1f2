//! The Telegram connection.
//!
//! A connection is a bot token that Telegram accepted. Connecting validates
//! the token with `getMe` and writes it back to the `.env` file so the next
//! start picks it up again.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::Url;
use relay_core::config::BOT_TOKEN_ENV;
use relay_core::{upsert_env_var, DeliveryError, ReplySender};
use teloxide::prelude::*;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::{Result, TelegramError};

/// Holds the current bot, if any.
pub struct TelegramLink {
    bot: RwLock<Option<Bot>>,
    env_file: PathBuf,
    api_url: Option<Url>,
}

impl TelegramLink {
    /// Create a disconnected link persisting to `env_file`.
    pub fn new(env_file: impl Into<PathBuf>) -> Self {
        Self {
            bot: RwLock::new(None),
            env_file: env_file.into(),
            api_url: None,
        }
    }

    /// Talks to another Bot API server instead of api.telegram.org.
    pub fn with_api_url(mut self, url: Url) -> Self {
        self.api_url = Some(url);
        self
    }

    /// The `.env` file the token is written to.
    pub fn env_file(&self) -> &Path {
        &self.env_file
    }

    pub async fn is_connected(&self) -> bool {
        self.bot.read().await.is_some()
    }

    /// The connected bot.
    pub async fn bot(&self) -> Result<Bot> {
        self.bot.read().await.clone().ok_or(TelegramError::NotConnected)
    }

    /// Validates `token` and returns the bot with its username.
    async fn validate(&self, token: &str) -> Result<(Bot, String)> {
        let token = token.trim();
        if token.is_empty() {
            return Err(TelegramError::NoToken);
        }

        let mut bot = Bot::new(token);
        if let Some(url) = &self.api_url {
            bot = bot.set_api_url(url.clone());
        }
        let me = bot
            .get_me()
            .await
            .map_err(|e| TelegramError::ValidationFailed(e.to_string()))?;
        Ok((bot, me.username().to_string()))
    }

    /// Reconnects with a token that is already persisted.
    pub async fn restore(&self, token: &str) -> Result<String> {
        let (bot, username) = self.validate(token).await?;
        *self.bot.write().await = Some(bot);
        info!(bot = %username, "Restored Telegram connection");
        Ok(username)
    }

    /// Connects with a new token and persists it.
    ///
    /// Returns the bot's username.
    pub async fn connect(&self, token: &str) -> Result<String> {
        let (bot, username) = self.validate(token).await?;
        upsert_env_var(&self.env_file, BOT_TOKEN_ENV, token.trim())?;
        *self.bot.write().await = Some(bot);
        info!(bot = %username, "Telegram connected");
        Ok(username)
    }

    /// Drops the connection and clears the persisted token.
    pub async fn disconnect(&self) -> Result<()> {
        let previous = self.bot.write().await.take();
        if previous.is_none() {
            warn!("Disconnect requested but Telegram was not connected");
        }
        upsert_env_var(&self.env_file, BOT_TOKEN_ENV, "")?;
        info!("Telegram disconnected");
        Ok(())
    }
}

#[async_trait]
impl ReplySender for TelegramLink {
    async fn send_text(&self, user_id: i64, text: &str) -> std::result::Result<(), DeliveryError> {
        let bot = self.bot().await.map_err(|_| DeliveryError::NotConnected)?;
        bot.send_message(ChatId(user_id), text)
            .await
            .map_err(|e| DeliveryError::Failed(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_new_link_is_disconnected() {
        let link = TelegramLink::new("/nonexistent/.env");
        assert!(!link.is_connected().await);
        assert!(matches!(link.bot().await, Err(TelegramError::NotConnected)));
    }

    #[tokio::test]
    async fn test_send_without_connection() {
        let link = TelegramLink::new("/nonexistent/.env");
        let err = link.send_text(42, "hello").await.unwrap_err();
        assert!(matches!(err, DeliveryError::NotConnected));
    }

    #[tokio::test]
    async fn test_connect_requires_token() {
        let dir = tempdir().unwrap();
        let link = TelegramLink::new(dir.path().join(".env"));

        assert!(matches!(link.connect("   ").await, Err(TelegramError::NoToken)));
        assert!(!dir.path().join(".env").exists());
    }

    #[tokio::test]
    async fn test_disconnect_clears_persisted_token() {
        let dir = tempdir().unwrap();
        let env = dir.path().join(".env");
        std::fs::write(&env, "PORT=3000\nTELEGRAM_BOT_TOKEN=123:abc\n").unwrap();

        let link = TelegramLink::new(&env);
        link.disconnect().await.unwrap();

        let content = std::fs::read_to_string(&env).unwrap();
        assert_eq!(content, "PORT=3000\nTELEGRAM_BOT_TOKEN=\n");
        assert!(!link.is_connected().await);
    }
}
