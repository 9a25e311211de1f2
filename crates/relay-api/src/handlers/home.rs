//! Dashboard and profile handlers.

use axum::{extract::State, Json};
use relay_models::UserProfile;
use tracing::warn;

use crate::auth::AuthUser;
use crate::state::AppState;
use crate::types::DashboardResponse;

/// GET / - Dashboard overview.
pub async fn dashboard(State(state): State<AppState>, AuthUser(user): AuthUser) -> Json<DashboardResponse> {
    let contact_count = state.contacts.count().unwrap_or_else(|e| {
        warn!(error = %e, "Could not count contacts");
        0
    });

    Json(DashboardResponse {
        user: user.profile(),
        telegram_connected: state.link.is_connected().await,
        monitor_active: state.monitor.is_active().await,
        contact_count,
        knowledge_base_entries: state.knowledge.load().len(),
        auto_respond_all: state.responder.respond_to_all(),
    })
}

/// GET /profile - The logged-in operator.
pub async fn profile(AuthUser(user): AuthUser) -> Json<UserProfile> {
    Json(user.profile())
}
