//! Sign-up, login and logout handlers.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse},
    Json,
};
use relay_models::UserAccount;
use relay_persistence::validate_username;
use tracing::info;

use crate::auth::{hash_password, verify_password};
use crate::error::{ApiError, Result};
use crate::session::{clear_cookie, session_cookie, token_from_headers};
use crate::state::AppState;
use crate::types::{parse_dob, AccountResponse, LoginRequest, MessageResponse, SignupRequest};

/// POST /signup - Create an operator account.
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AccountResponse>)> {
    let username = req.username.trim();

    if req.password != req.confirm_password {
        return Err(ApiError::BadRequest("Passwords do not match".to_string()));
    }
    if req.password.is_empty() {
        return Err(ApiError::BadRequest("Password is required".to_string()));
    }
    validate_username(username)?;
    let dob = parse_dob(&req.dob)
        .ok_or_else(|| ApiError::BadRequest("Invalid date of birth".to_string()))?;

    if state.users.exists(username) {
        return Err(ApiError::Conflict("Username already exists".to_string()));
    }

    let hash = hash_password(&req.password, state.hash_cost).await?;
    let user = UserAccount::new(username, hash, dob);
    state.users.save(&user)?;
    info!(username = %username, "Account created");

    Ok((
        StatusCode::CREATED,
        Json(AccountResponse {
            message: "Account created. Please log in.".to_string(),
            user: user.profile(),
        }),
    ))
}

/// POST /login - Verify credentials and start a session.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let user = state
        .users
        .find(req.username.trim())?
        .ok_or_else(|| ApiError::Unauthorized("Incorrect username.".to_string()))?;

    if !verify_password(&req.password, &user.password_hash).await? {
        return Err(ApiError::Unauthorized("Incorrect password.".to_string()));
    }

    let token = state.sessions.create(&user.username).await;
    info!(username = %user.username, "Logged in");

    Ok((
        AppendHeaders([(header::SET_COOKIE, session_cookie(&token, state.sessions.ttl()))]),
        Json(AccountResponse {
            message: "Logged in".to_string(),
            user: user.profile(),
        }),
    ))
}

/// POST /logout - End the session.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = token_from_headers(&headers) {
        state.sessions.destroy(&token).await;
    }
    (
        AppendHeaders([(header::SET_COOKIE, clear_cookie())]),
        Json(MessageResponse::new("Logged out")),
    )
}
