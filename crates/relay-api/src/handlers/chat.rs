//! Auto-responder control and manual chat.

use axum::{extract::State, Json};
use relay_core::ReplySender;
use tracing::{info, warn};

use crate::auth::AuthUser;
use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::{
    AutoRespondResponse, ChatOverviewResponse, ChatSendRequest, ChatSendResponse, UserIdRequest,
};

fn toggles(state: &AppState, message: impl Into<String>) -> Json<AutoRespondResponse> {
    Json(AutoRespondResponse {
        auto_respond_all: state.responder.respond_to_all(),
        auto_respond_users: state.responder.enabled_users(),
        message: message.into(),
    })
}

/// GET /ollama-chat - Conversations and auto-respond settings.
pub async fn overview(State(state): State<AppState>, _user: AuthUser) -> Json<ChatOverviewResponse> {
    Json(ChatOverviewResponse {
        conversations: state.responder.tracker().snapshot(),
        auto_respond_all: state.responder.respond_to_all(),
        auto_respond_users: state.responder.enabled_users(),
    })
}

/// POST /ollama-chat/send - Answer a message as the auto-responder would.
pub async fn send(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<ChatSendRequest>,
) -> Result<Json<ChatSendResponse>> {
    let message = req.message.as_deref().map(str::trim).unwrap_or_default();
    let user_id = match req.user_id() {
        Some(id) if !message.is_empty() => id,
        _ => {
            return Err(ApiError::BadRequest(
                "User ID and message are required".to_string(),
            ))
        }
    };

    let kb = state.knowledge.load();
    let reply = state.responder.process_message(message, user_id, &kb).await;

    let success = match state.link.send_text(user_id, &reply.response).await {
        Ok(()) => true,
        Err(e) => {
            warn!(user_id = %user_id, error = %e, "Error sending response");
            false
        }
    };

    Ok(Json(ChatSendResponse {
        success,
        response: reply.response,
        source: reply.source,
    }))
}

/// POST /ollama-chat/auto-respond/all/enable
pub async fn enable_all(State(state): State<AppState>, _user: AuthUser) -> Json<AutoRespondResponse> {
    state.responder.set_respond_to_all(true);
    toggles(&state, "Auto-respond enabled for all users")
}

/// POST /ollama-chat/auto-respond/all/disable
pub async fn disable_all(State(state): State<AppState>, _user: AuthUser) -> Json<AutoRespondResponse> {
    state.responder.set_respond_to_all(false);
    toggles(&state, "Auto-respond disabled for all users")
}

/// POST /ollama-chat/auto-respond/enable
pub async fn enable_user(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<UserIdRequest>,
) -> Result<Json<AutoRespondResponse>> {
    let user_id = req
        .user_id()
        .ok_or_else(|| ApiError::BadRequest("User ID is required".to_string()))?;
    state.responder.enable_user(user_id);
    info!(user_id = %user_id, "Auto-respond enabled from dashboard");
    Ok(toggles(&state, format!("Auto-respond enabled for user {}", user_id)))
}

/// POST /ollama-chat/auto-respond/disable
pub async fn disable_user(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<UserIdRequest>,
) -> Result<Json<AutoRespondResponse>> {
    let user_id = req
        .user_id()
        .ok_or_else(|| ApiError::BadRequest("User ID is required".to_string()))?;
    state.responder.disable_user(user_id);
    Ok(toggles(&state, format!("Auto-respond disabled for user {}", user_id)))
}
