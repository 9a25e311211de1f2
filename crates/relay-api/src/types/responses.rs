//! Response DTOs for the API.

use relay_core::ConversationState;
use relay_models::{ContactSummary, KnowledgeEntry, ReplySource, UserProfile};
use serde::Serialize;

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
    /// Uptime in seconds.
    pub uptime_seconds: u64,
}

/// Generic confirmation.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Successful login or sign-up.
#[derive(Debug, Clone, Serialize)]
pub struct AccountResponse {
    pub message: String,
    pub user: UserProfile,
}

/// Next step of the forgot-password flow.
#[derive(Debug, Clone, Serialize)]
pub struct ResetStepResponse {
    /// Step the client should submit next, or `done`.
    pub next_step: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_token: Option<String>,
    pub message: String,
}

/// Dashboard overview.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardResponse {
    pub user: UserProfile,
    pub telegram_connected: bool,
    pub monitor_active: bool,
    pub contact_count: usize,
    pub knowledge_base_entries: usize,
    pub auto_respond_all: bool,
}

/// Knowledge base listing.
#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeListResponse {
    pub entries: Vec<KnowledgeEntry>,
    pub total: usize,
}

/// Telegram connection state.
#[derive(Debug, Clone, Serialize)]
pub struct TelegramStatusResponse {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Monitor page.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorResponse {
    pub active: bool,
    pub contacts: Vec<ContactSummary>,
    pub ignored: Vec<i64>,
}

/// Result of a monitor or ignore-list change.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorStateResponse {
    pub active: bool,
    pub ignored: Vec<i64>,
    pub message: String,
}

/// Chat page.
#[derive(Debug, Clone, Serialize)]
pub struct ChatOverviewResponse {
    pub conversations: Vec<ConversationState>,
    pub auto_respond_all: bool,
    pub auto_respond_users: Vec<i64>,
}

/// Manual chat send result.
#[derive(Debug, Clone, Serialize)]
pub struct ChatSendResponse {
    /// Whether Telegram accepted the reply.
    pub success: bool,
    pub response: String,
    pub source: ReplySource,
}

/// Auto-respond toggles after a change.
#[derive(Debug, Clone, Serialize)]
pub struct AutoRespondResponse {
    pub auto_respond_all: bool,
    pub auto_respond_users: Vec<i64>,
    pub message: String,
}
