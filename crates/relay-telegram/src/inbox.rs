//! Inbound direct-message pipeline.
//!
//! Independent of the Telegram SDK: the monitor converts updates into
//! [`IncomingSender`] / [`IncomingMessage`] and hands them over here.

use std::collections::HashSet;
use std::sync::Arc;

use relay_core::{AutoResponder, ReplySender};
use relay_models::{IncomingMessage, IncomingSender, ProcessedReply};
use relay_persistence::{ContactStore, KnowledgeStore};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

/// Logs direct messages and feeds them to the auto-responder.
pub struct Inbox {
    contacts: Arc<ContactStore>,
    knowledge: Arc<KnowledgeStore>,
    responder: Arc<AutoResponder>,
    ignored: RwLock<HashSet<i64>>,
}

impl Inbox {
    pub fn new(
        contacts: Arc<ContactStore>,
        knowledge: Arc<KnowledgeStore>,
        responder: Arc<AutoResponder>,
    ) -> Self {
        Self {
            contacts,
            knowledge,
            responder,
            ignored: RwLock::new(HashSet::new()),
        }
    }

    pub fn contacts(&self) -> &Arc<ContactStore> {
        &self.contacts
    }

    pub fn responder(&self) -> &Arc<AutoResponder> {
        &self.responder
    }

    /// Stops logging and replying to `user_id`.
    pub async fn ignore(&self, user_id: i64) {
        self.ignored.write().await.insert(user_id);
        info!(user_id = %user_id, "Contact ignored");
    }

    pub async fn unignore(&self, user_id: i64) {
        self.ignored.write().await.remove(&user_id);
        info!(user_id = %user_id, "Contact no longer ignored");
    }

    pub async fn is_ignored(&self, user_id: i64) -> bool {
        self.ignored.read().await.contains(&user_id)
    }

    /// Ignored contacts, ascending.
    pub async fn ignored(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.ignored.read().await.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Handles one direct message.
    ///
    /// Returns the auto-reply, if one was produced.
    pub async fn on_direct_message(
        &self,
        sender: IncomingSender,
        message: IncomingMessage,
        reply_via: &dyn ReplySender,
    ) -> Option<ProcessedReply> {
        if self.is_ignored(sender.id).await {
            debug!(user_id = %sender.id, "Dropping message from ignored contact");
            return None;
        }

        if let Err(e) = self.contacts.append(&sender, &message) {
            error!(user_id = %sender.id, error = %e, "Error saving message");
            return None;
        }

        let kb = self.knowledge.load();
        self.responder
            .handle_incoming(sender.id, &message.text, &kb, reply_via)
            .await
    }
}
