//! Conversation state tracking.
//!
//! A conversation with a contact is "new" when we have never heard from
//! them, or when their previous message is older than the idle timeout.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Idle time after which the next message starts a new conversation.
pub const CONVERSATION_TIMEOUT_SECS: i64 = 3600;

/// State of one contact's conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationState {
    pub user_id: i64,
    /// True only for the first message of a conversation.
    pub is_new: bool,
    pub started_at: DateTime<Utc>,
    pub last_message_at: DateTime<Utc>,
    pub message_count: u32,
}

/// Tracks conversation state per contact.
pub struct ConversationTracker {
    states: Mutex<HashMap<i64, ConversationState>>,
    timeout: Duration,
}

impl ConversationTracker {
    /// Creates a tracker with the default one hour timeout.
    pub fn new() -> Self {
        Self::with_timeout(Duration::seconds(CONVERSATION_TIMEOUT_SECS))
    }

    /// Creates a tracker with a custom idle timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            states: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    /// Registers a message from `user_id` at `now`.
    ///
    /// Returns true if this message opens a new conversation.
    pub fn touch(&self, user_id: i64, now: DateTime<Utc>) -> bool {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());

        let expired = states
            .get(&user_id)
            .map_or(true, |s| now - s.last_message_at > self.timeout);

        if expired {
            states.insert(
                user_id,
                ConversationState {
                    user_id,
                    is_new: true,
                    started_at: now,
                    last_message_at: now,
                    message_count: 1,
                },
            );
            return true;
        }

        if let Some(state) = states.get_mut(&user_id) {
            state.is_new = false;
            state.last_message_at = now;
            state.message_count += 1;
        }
        false
    }

    /// Returns the current state for a contact.
    pub fn get(&self, user_id: i64) -> Option<ConversationState> {
        self.states
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&user_id)
            .cloned()
    }

    /// All tracked conversations, most recent first.
    pub fn snapshot(&self) -> Vec<ConversationState> {
        let mut states: Vec<_> = self
            .states
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect();
        states.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
        states
    }

    /// Number of tracked conversations.
    pub fn len(&self) -> usize {
        self.states.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ConversationTracker {
    fn default() -> Self {
        Self::new()
    }
}
