//! Knowledge base CRUD handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use relay_models::{parse_keywords, parse_questions, KnowledgeEntry};
use tracing::info;

use crate::auth::AuthUser;
use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::{KnowledgeEntryRequest, KnowledgeListResponse, MessageResponse};

/// Validated form content: answer, questions, keywords.
fn parse_form(req: &KnowledgeEntryRequest) -> Result<(String, Vec<String>, Vec<String>)> {
    let answer = req.answer.trim();
    let questions = parse_questions(&req.questions);
    if answer.is_empty() || questions.is_empty() {
        return Err(ApiError::BadRequest(
            "Answer and at least one question are required".to_string(),
        ));
    }
    Ok((answer.to_string(), questions, parse_keywords(req.keywords.as_deref())))
}

fn entry_not_found(id: &str) -> ApiError {
    ApiError::NotFound(format!("Knowledge base entry not found: {}", id))
}

/// GET /knowledge-base - List all entries.
pub async fn list_entries(State(state): State<AppState>, _user: AuthUser) -> Json<KnowledgeListResponse> {
    let kb = state.knowledge.load();
    let total = kb.len();
    Json(KnowledgeListResponse {
        entries: kb.entries,
        total,
    })
}

/// GET /knowledge-base/:id - One entry.
pub async fn get_entry(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<KnowledgeEntry>> {
    state
        .knowledge
        .get(&id)
        .map(Json)
        .ok_or_else(|| entry_not_found(&id))
}

/// POST /knowledge-base/add - Create an entry.
pub async fn add_entry(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<KnowledgeEntryRequest>,
) -> Result<(StatusCode, Json<KnowledgeEntry>)> {
    let (answer, questions, keywords) = parse_form(&req)?;
    let entry = state
        .knowledge
        .add(KnowledgeEntry::new(answer, questions, keywords))?;
    info!(id = %entry.id, "Knowledge base entry added");
    Ok((StatusCode::CREATED, Json(entry)))
}

/// POST /knowledge-base/update/:id - Replace an entry's content.
pub async fn update_entry(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<KnowledgeEntryRequest>,
) -> Result<Json<KnowledgeEntry>> {
    let (answer, questions, keywords) = parse_form(&req)?;
    let entry = state
        .knowledge
        .update(&id, &answer, questions, keywords)
        .map_err(|e| if e.is_not_found() { entry_not_found(&id) } else { e.into() })?;
    info!(id = %entry.id, "Knowledge base entry updated");
    Ok(Json(entry))
}

/// POST /knowledge-base/delete/:id - Remove an entry.
pub async fn delete_entry(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    state
        .knowledge
        .delete(&id)
        .map_err(|e| if e.is_not_found() { entry_not_found(&id) } else { e.into() })?;
    info!(id = %id, "Knowledge base entry deleted");
    Ok(Json(MessageResponse::new("Entry deleted successfully")))
}
