//! Request DTOs for the API.

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

/// Sign-up form.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, alias = "confirmPassword")]
    pub confirm_password: String,
    /// Date of birth, `YYYY-MM-DD`.
    #[serde(default)]
    pub dob: String,
}

/// Login form.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// One step of the forgot-password flow.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "step", rename_all = "lowercase")]
pub enum ForgotPasswordRequest {
    /// Identify the account.
    Username { username: String },
    /// Prove the date of birth.
    Dob { username: String, dob: String },
    /// Set the new password with the ticket from the previous step.
    Reset {
        username: String,
        #[serde(alias = "resetToken")]
        reset_token: String,
        #[serde(alias = "newPassword")]
        new_password: String,
        #[serde(alias = "confirmPassword")]
        confirm_password: String,
    },
}

/// Knowledge base add/update form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KnowledgeEntryRequest {
    #[serde(default)]
    pub answer: String,
    /// Newline-separated question variants.
    #[serde(default)]
    pub questions: String,
    /// Comma-separated keywords.
    pub keywords: Option<String>,
}

/// Telegram connect form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectTelegramRequest {
    /// Bot token; falls back to the configured one.
    pub token: Option<String>,
}

/// A Telegram user id as sent by a form (string) or a script (number).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UserIdInput {
    Number(i64),
    Text(String),
}

impl UserIdInput {
    /// The numeric id, if present and well-formed.
    pub fn value(&self) -> Option<i64> {
        match self {
            UserIdInput::Number(id) => Some(*id),
            UserIdInput::Text(text) => text.trim().parse().ok(),
        }
    }
}

/// Body naming a single contact.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserIdRequest {
    #[serde(alias = "userId")]
    pub user_id: Option<UserIdInput>,
}

impl UserIdRequest {
    pub fn user_id(&self) -> Option<i64> {
        self.user_id.as_ref().and_then(UserIdInput::value)
    }
}

/// Manual chat message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatSendRequest {
    #[serde(alias = "userId")]
    pub user_id: Option<UserIdInput>,
    pub message: Option<String>,
}

impl ChatSendRequest {
    pub fn user_id(&self) -> Option<i64> {
        self.user_id.as_ref().and_then(UserIdInput::value)
    }
}

/// Parses a date of birth, accepting a plain date or a full timestamp.
pub fn parse_dob(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}
