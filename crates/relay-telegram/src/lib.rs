//! Telegram side of tg-relay.
//!
//! This crate connects a Telegram bot, listens for direct messages and
//! passes them through the logging and auto-reply pipeline.
//!
//! # Components
//!
//! - [`TelegramLink`]: the bot connection; also the [`relay_core::ReplySender`]
//!   replies go out through
//! - [`Inbox`]: SDK-independent handling of one direct message
//! - [`Monitor`]: start/stop of the teloxide dispatcher feeding the inbox
//!
//! # Environment Variables
//!
//! - `TELEGRAM_BOT_TOKEN`: Bot token from @BotFather, written back on connect
//! - `TELEGRAM_API_URL`: Optional Bot API server (read by the config, passed to
//!   [`TelegramLink::with_api_url`])
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use relay_telegram::{Inbox, Monitor, TelegramLink};
//!
//! # async fn run(inbox: Arc<Inbox>) -> relay_telegram::Result<()> {
//! let link = Arc::new(TelegramLink::new(".env"));
//! link.connect("123456:ABC-DEF").await?;
//!
//! let monitor = Monitor::new(inbox, Arc::clone(&link));
//! monitor.start(link.bot().await?).await;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod inbox;
pub mod link;
pub mod monitor;

pub use error::{Result, TelegramError};
pub use inbox::Inbox;
pub use link::TelegramLink;
pub use monitor::{convert_message, media_kind, Monitor};
