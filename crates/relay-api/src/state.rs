//! Application state shared across handlers.

use std::sync::Arc;

use relay_core::{AutoResponder, LanguageModel, RelayConfig};
use relay_persistence::{ContactStore, KnowledgeStore, UserStore};
use relay_telegram::{Inbox, Monitor, TelegramLink};

use crate::config::ApiConfig;
use crate::session::{ResetTickets, SessionStore};

/// bcrypt work factor for stored passwords.
pub const PASSWORD_HASH_COST: u32 = 10;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// HTTP server configuration.
    pub config: Arc<ApiConfig>,
    /// Data, LLM and Telegram configuration.
    pub relay: Arc<RelayConfig>,
    pub users: Arc<UserStore>,
    pub knowledge: Arc<KnowledgeStore>,
    pub contacts: Arc<ContactStore>,
    pub responder: Arc<AutoResponder>,
    pub link: Arc<TelegramLink>,
    pub inbox: Arc<Inbox>,
    pub monitor: Arc<Monitor>,
    pub sessions: Arc<SessionStore>,
    pub reset_tickets: Arc<ResetTickets>,
    /// bcrypt cost used for new hashes.
    pub hash_cost: u32,
}

impl AppState {
    /// Wires all components from configuration.
    pub fn new(config: ApiConfig, relay: RelayConfig, model: Arc<dyn LanguageModel>) -> Self {
        let users = Arc::new(UserStore::new(relay.users_dir()));
        let knowledge = Arc::new(KnowledgeStore::new(relay.knowledge_base_file()));
        let contacts = Arc::new(ContactStore::new(relay.contacts_dir()));
        let responder = Arc::new(AutoResponder::new(model, relay.responder_settings()));
        let mut link = TelegramLink::new(relay.env_file());
        if let Some(url) = &relay.telegram_api_url {
            link = link.with_api_url(url.clone());
        }
        let link = Arc::new(link);
        let inbox = Arc::new(Inbox::new(
            Arc::clone(&contacts),
            Arc::clone(&knowledge),
            Arc::clone(&responder),
        ));
        let monitor = Arc::new(Monitor::new(Arc::clone(&inbox), Arc::clone(&link)));
        let sessions = Arc::new(SessionStore::new(relay.session_ttl));

        Self {
            config: Arc::new(config),
            relay: Arc::new(relay),
            users,
            knowledge,
            contacts,
            responder,
            link,
            inbox,
            monitor,
            sessions,
            reset_tickets: Arc::new(ResetTickets::default()),
            hash_cost: PASSWORD_HASH_COST,
        }
    }

    /// Overrides the bcrypt cost.
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }
}
