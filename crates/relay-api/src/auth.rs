//! Password hashing and the authenticated-user extractor.

use axum::{extract::FromRequestParts, http::request::Parts};
use relay_models::UserAccount;
use tracing::debug;

use crate::error::{ApiError, Result};
use crate::session::token_from_headers;
use crate::state::AppState;

/// Hashes a password off the async runtime.
pub async fn hash_password(password: &str, cost: u32) -> Result<String> {
    let password = password.to_string();
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hash)
}

/// Checks a password against a stored hash off the async runtime.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let password = password.to_string();
    let hash = hash.to_string();
    let ok = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
    Ok(ok)
}

/// The logged-in operator, reloaded from disk on every request.
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserAccount);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let token = token_from_headers(&parts.headers).ok_or_else(ApiError::login_required)?;
        let username = state
            .sessions
            .username(&token)
            .await
            .ok_or_else(ApiError::login_required)?;

        match state.users.find(&username)? {
            Some(user) => Ok(AuthUser(user)),
            None => {
                debug!(username = %username, "Session refers to a deleted user");
                state.sessions.destroy(&token).await;
                Err(ApiError::login_required())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hash = hash_password("s3cret", 4).await.unwrap();
        assert!(hash.starts_with("$2"));
        assert!(verify_password("s3cret", &hash).await.unwrap());
        assert!(!verify_password("wrong", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_garbage_hash_is_error() {
        assert!(verify_password("x", "not-a-hash").await.is_err());
    }
}
