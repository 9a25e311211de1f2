//! Direct-message monitor.
//!
//! Wraps a single teloxide [`Dispatcher`] running on a spawned task. Only
//! private chats from human senders are forwarded to the [`Inbox`].

use std::sync::Arc;

use relay_models::{IncomingMessage, IncomingSender};
use teloxide::dispatching::ShutdownToken;
use teloxide::prelude::*;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::inbox::Inbox;
use crate::link::TelegramLink;

/// A running dispatcher.
struct Running {
    token: ShutdownToken,
    handle: JoinHandle<()>,
}

impl Running {
    fn is_live(&self) -> bool {
        !self.handle.is_finished()
    }

    async fn shutdown(self) {
        match self.token.shutdown() {
            Ok(done) => done.await,
            // Still starting up; nothing to drain
            Err(_) => self.handle.abort(),
        }
    }
}

/// Start/stop control around the Telegram dispatcher.
pub struct Monitor {
    inbox: Arc<Inbox>,
    link: Arc<TelegramLink>,
    running: Mutex<Option<Running>>,
}

impl Monitor {
    pub fn new(inbox: Arc<Inbox>, link: Arc<TelegramLink>) -> Self {
        Self {
            inbox,
            link,
            running: Mutex::new(None),
        }
    }

    pub fn inbox(&self) -> &Arc<Inbox> {
        &self.inbox
    }

    /// Whether the dispatcher is running.
    pub async fn is_active(&self) -> bool {
        self.running
            .lock()
            .await
            .as_ref()
            .map_or(false, Running::is_live)
    }

    /// Starts listening for direct messages.
    ///
    /// Returns false if the monitor was already running.
    pub async fn start(&self, bot: Bot) -> bool {
        let mut running = self.running.lock().await;
        if running.as_ref().map_or(false, Running::is_live) {
            debug!("Monitor already active");
            return false;
        }

        *running = Some(self.spawn(bot));
        info!("Telegram monitoring started");
        true
    }

    /// Stops listening.
    ///
    /// Returns false if the monitor was not running.
    pub async fn stop(&self) -> bool {
        let Some(current) = self.running.lock().await.take() else {
            return false;
        };

        current.shutdown().await;
        info!("Telegram monitoring stopped");
        true
    }

    /// Moves an active monitor over to `bot`.
    ///
    /// The old dispatcher is fully shut down before the new one starts.
    /// Returns false, starting nothing, if the monitor was not active.
    pub async fn switch_bot(&self, bot: Bot) -> bool {
        let mut running = self.running.lock().await;
        let Some(current) = running.take() else {
            return false;
        };
        if !current.is_live() {
            current.handle.abort();
            return false;
        }

        current.shutdown().await;
        *running = Some(self.spawn(bot));
        info!("Telegram monitoring moved to the new bot");
        true
    }

    fn spawn(&self, bot: Bot) -> Running {
        let inbox = Arc::clone(&self.inbox);
        let link = Arc::clone(&self.link);

        let handler = Update::filter_message()
            .filter(is_direct_message)
            .endpoint(move |msg: Message| {
                let inbox = Arc::clone(&inbox);
                let link = Arc::clone(&link);
                async move {
                    if let Some((sender, message)) = convert_message(&msg) {
                        info!(
                            user_id = %sender.id,
                            name = %sender.full_name(),
                            "New message received"
                        );
                        inbox.on_direct_message(sender, message, link.as_ref()).await;
                    }
                    respond(())
                }
            });

        let mut dispatcher = Dispatcher::builder(bot, handler)
            .default_handler(|upd| async move {
                debug!(update_id = ?upd.id, "Ignoring non-message update");
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "Error in Telegram message handler",
            ))
            .build();

        let token = dispatcher.shutdown_token();
        let handle = tokio::spawn(async move {
            dispatcher.dispatch().await;
        });
        Running { token, handle }
    }
}

/// Private chat with a human sender.
fn is_direct_message(msg: Message) -> bool {
    msg.chat.is_private() && msg.from.as_ref().map_or(false, |u| !u.is_bot)
}

/// Name of the media attached to a message, if any.
pub fn media_kind(msg: &Message) -> Option<&'static str> {
    if msg.photo().is_some() {
        Some("photo")
    } else if msg.video().is_some() {
        Some("video")
    } else if msg.animation().is_some() {
        Some("animation")
    } else if msg.document().is_some() {
        Some("document")
    } else if msg.audio().is_some() {
        Some("audio")
    } else if msg.voice().is_some() {
        Some("voice")
    } else if msg.video_note().is_some() {
        Some("video_note")
    } else if msg.sticker().is_some() {
        Some("sticker")
    } else if msg.location().is_some() {
        Some("location")
    } else if msg.contact().is_some() {
        Some("contact")
    } else {
        None
    }
}

/// Converts a teloxide message into the SDK-independent pair.
pub fn convert_message(msg: &Message) -> Option<(IncomingSender, IncomingMessage)> {
    let Some(user) = msg.from.as_ref() else {
        warn!(chat_id = %msg.chat.id, "Message without sender");
        return None;
    };

    let mut sender = IncomingSender::new(user.id.0 as i64).with_first_name(&user.first_name);
    if let Some(last) = &user.last_name {
        sender = sender.with_last_name(last);
    }
    if let Some(username) = &user.username {
        sender = sender.with_username(username);
    }

    let text = msg.text().or_else(|| msg.caption()).unwrap_or_default();
    let mut message = IncomingMessage::text(i64::from(msg.id.0), text, msg.date);
    if let Some(kind) = media_kind(msg) {
        message = message.with_media(kind);
    }

    Some((sender, message))
}
