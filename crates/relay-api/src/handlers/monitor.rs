//! Direct-message monitor handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use relay_models::ContactLog;

use crate::auth::AuthUser;
use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::{MonitorResponse, MonitorStateResponse, UserIdRequest};

async fn require_connection(state: &AppState) -> Result<()> {
    if state.link.is_connected().await {
        Ok(())
    } else {
        Err(ApiError::ServiceUnavailable(
            "Telegram is not connected. Connect it first.".to_string(),
        ))
    }
}

async fn monitor_state(state: &AppState, message: impl Into<String>) -> Json<MonitorStateResponse> {
    Json(MonitorStateResponse {
        active: state.monitor.is_active().await,
        ignored: state.inbox.ignored().await,
        message: message.into(),
    })
}

/// GET /telegram/monitor - Monitor state and contact list.
pub async fn overview(State(state): State<AppState>, _user: AuthUser) -> Result<Json<MonitorResponse>> {
    require_connection(&state).await?;
    Ok(Json(MonitorResponse {
        active: state.monitor.is_active().await,
        contacts: state.contacts.list_summaries()?,
        ignored: state.inbox.ignored().await,
    }))
}

/// POST /telegram/monitor/start
pub async fn start(State(state): State<AppState>, _user: AuthUser) -> Result<Json<MonitorStateResponse>> {
    require_connection(&state).await?;
    let bot = state.link.bot().await?;
    let message = if state.monitor.start(bot).await {
        "Telegram monitoring started"
    } else {
        "Telegram monitoring is already active"
    };
    Ok(monitor_state(&state, message).await)
}

/// POST /telegram/monitor/stop
pub async fn stop(State(state): State<AppState>, _user: AuthUser) -> Json<MonitorStateResponse> {
    let message = if state.monitor.stop().await {
        "Telegram monitoring stopped"
    } else {
        "Telegram monitoring was not active"
    };
    monitor_state(&state, message).await
}

/// GET /telegram/monitor/user/:id - One contact's log, newest first.
pub async fn contact(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ContactLog>> {
    state.contacts.load_newest_first(id).map(Json).map_err(|e| {
        if e.is_not_found() {
            ApiError::NotFound("User data not found".to_string())
        } else {
            e.into()
        }
    })
}

fn required_user_id(req: &UserIdRequest) -> Result<i64> {
    req.user_id()
        .ok_or_else(|| ApiError::BadRequest("User ID is required".to_string()))
}

/// POST /telegram/monitor/ignore
pub async fn ignore(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<UserIdRequest>,
) -> Result<Json<MonitorStateResponse>> {
    let user_id = required_user_id(&req)?;
    state.inbox.ignore(user_id).await;
    Ok(monitor_state(&state, format!("Ignoring user {}", user_id)).await)
}

/// POST /telegram/monitor/unignore
pub async fn unignore(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<UserIdRequest>,
) -> Result<Json<MonitorStateResponse>> {
    let user_id = required_user_id(&req)?;
    state.inbox.unignore(user_id).await;
    Ok(monitor_state(&state, format!("No longer ignoring user {}", user_id)).await)
}
