//! Three-step password reset.
//!
//! `username` → `dob` → `reset`. Passing the date-of-birth check issues a
//! single-use ticket that the final step must present.

use axum::{extract::State, Json};
use tracing::{info, warn};

use crate::auth::hash_password;
use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::{parse_dob, ForgotPasswordRequest, ResetStepResponse};

fn user_not_found() -> ApiError {
    ApiError::NotFound("Username not found".to_string())
}

/// POST /forgot-password - Advance the reset flow by one step.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<ResetStepResponse>> {
    match req {
        ForgotPasswordRequest::Username { username } => {
            let user = state.users.find(username.trim())?.ok_or_else(user_not_found)?;
            Ok(Json(ResetStepResponse {
                next_step: "dob".to_string(),
                username: user.username,
                reset_token: None,
                message: "Please enter your date of birth".to_string(),
            }))
        }
        ForgotPasswordRequest::Dob { username, dob } => {
            let user = state.users.find(username.trim())?.ok_or_else(user_not_found)?;
            if parse_dob(&dob) != Some(user.dob) {
                warn!(username = %user.username, "Password reset: date of birth mismatch");
                return Err(ApiError::BadRequest("Incorrect date of birth".to_string()));
            }
            let ticket = state.reset_tickets.issue(&user.username).await;
            Ok(Json(ResetStepResponse {
                next_step: "reset".to_string(),
                username: user.username,
                reset_token: Some(ticket),
                message: "Please choose a new password".to_string(),
            }))
        }
        ForgotPasswordRequest::Reset {
            username,
            reset_token,
            new_password,
            confirm_password,
        } => {
            let username = username.trim();
            if new_password != confirm_password {
                return Err(ApiError::BadRequest("Passwords do not match".to_string()));
            }
            if new_password.is_empty() {
                return Err(ApiError::BadRequest("Password is required".to_string()));
            }
            let mut user = state.users.find(username)?.ok_or_else(user_not_found)?;
            if !state.reset_tickets.redeem(&reset_token, &user.username).await {
                return Err(ApiError::Unauthorized(
                    "Password reset session is invalid or has expired".to_string(),
                ));
            }

            user.password_hash = hash_password(&new_password, state.hash_cost).await?;
            state.users.save(&user)?;
            info!(username = %user.username, "Password reset");

            Ok(Json(ResetStepResponse {
                next_step: "done".to_string(),
                username: user.username,
                reset_token: None,
                message: "Password has been reset. Please log in.".to_string(),
            }))
        }
    }
}
