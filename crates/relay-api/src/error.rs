//! API error types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use relay_persistence::PersistenceError;
use relay_telegram::TelegramError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// API error type for consistent error responses.
///
/// The message is shown to the dashboard user as-is.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Bad request - invalid input.
    #[error("{0}")]
    BadRequest(String),

    /// Missing or failed authentication.
    #[error("{0}")]
    Unauthorized(String),

    /// Internal server error.
    #[error("{0}")]
    Internal(String),

    /// Conflict - resource already exists.
    #[error("{0}")]
    Conflict(String),

    /// Service unavailable.
    #[error("{0}")]
    ServiceUnavailable(String),
}

impl ApiError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// The 401 returned to requests without a valid session.
    pub fn login_required() -> Self {
        ApiError::Unauthorized("Please log in to view this resource".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(status = %status, error = %self, "Request failed");
        }
        let body = Json(json!({
            "error": self.to_string()
        }));
        (status, body).into_response()
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            PersistenceError::InvalidData(msg) => ApiError::BadRequest(msg),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<TelegramError> for ApiError {
    fn from(err: TelegramError) -> Self {
        match err {
            TelegramError::NoToken | TelegramError::ValidationFailed(_) => {
                ApiError::BadRequest(err.to_string())
            }
            TelegramError::NotConnected => ApiError::ServiceUnavailable(err.to_string()),
            TelegramError::IoError(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<bcrypt::BcryptError> for ApiError {
    fn from(err: bcrypt::BcryptError) -> Self {
        ApiError::Internal(format!("password hashing failed: {}", err))
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("background task failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_status_codes() {
        assert_eq!(ApiError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::BadRequest("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthorized("x".into()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::ServiceUnavailable("x".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_api_error_display_is_bare_message() {
        let err = ApiError::Conflict("Username already exists".into());
        assert_eq!(err.to_string(), "Username already exists");
    }

    #[test]
    fn test_from_persistence_error() {
        let err: ApiError = PersistenceError::InvalidData("bad name".into()).into();
        assert!(matches!(err, ApiError::BadRequest(msg) if msg == "bad name"));

        let err: ApiError = PersistenceError::NotFound {
            kind: "entry".into(),
            id: "42".into(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_from_telegram_error() {
        let err: ApiError = TelegramError::NotConnected.into();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let err: ApiError = TelegramError::ValidationFailed("Unauthorized".into()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
