//! Telegram connection handlers.

use axum::{extract::State, Json};
use tracing::{info, warn};

use crate::auth::AuthUser;
use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::{ConnectTelegramRequest, TelegramStatusResponse};

/// GET /telegram/connect - Connection state.
pub async fn status(State(state): State<AppState>, _user: AuthUser) -> Json<TelegramStatusResponse> {
    Json(TelegramStatusResponse {
        connected: state.link.is_connected().await,
        bot_username: None,
        message: None,
    })
}

/// POST /telegram/connect - Validate and store a bot token.
///
/// An active monitor is moved over to the new bot.
pub async fn connect(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    body: Option<Json<ConnectTelegramRequest>>,
) -> Result<Json<TelegramStatusResponse>> {
    let token = body
        .and_then(|Json(req)| req.token)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| state.relay.bot_token.clone())
        .ok_or_else(|| {
            ApiError::BadRequest("A bot token is required to connect Telegram".to_string())
        })?;

    let bot_username = state.link.connect(&token).await?;
    if state.monitor.switch_bot(state.link.bot().await?).await {
        info!(bot = %bot_username, "Monitor restarted on the new bot");
    }
    state.users.set_telegram_connected(&user.username, true)?;
    info!(username = %user.username, bot = %bot_username, "Telegram linked to account");

    Ok(Json(TelegramStatusResponse {
        connected: true,
        message: Some(format!("Connected as @{}", bot_username)),
        bot_username: Some(bot_username),
    }))
}

/// POST /telegram/disconnect - Stop monitoring and forget the token.
pub async fn disconnect(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<TelegramStatusResponse>> {
    if state.monitor.stop().await {
        info!("Monitor stopped before disconnect");
    }
    if let Err(e) = state.link.disconnect().await {
        warn!(error = %e, "Failed to clear persisted bot token");
        return Err(e.into());
    }
    state.users.set_telegram_connected(&user.username, false)?;

    Ok(Json(TelegramStatusResponse {
        connected: false,
        bot_username: None,
        message: Some("Telegram disconnected".to_string()),
    }))
}
