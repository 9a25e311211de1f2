//! Operator account types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// An operator account as stored in `users/<username>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    /// Login name, also the file stem.
    pub username: String,

    /// bcrypt hash of the password.
    #[serde(rename = "password")]
    pub password_hash: String,

    /// Date of birth, used to verify password resets.
    pub dob: NaiveDate,

    /// Whether this operator has linked a Telegram account.
    #[serde(default)]
    pub telegram_connected: bool,

    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    /// Creates a new account with an already-hashed password.
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
        dob: NaiveDate,
    ) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            dob,
            telegram_connected: false,
            created_at: Utc::now(),
        }
    }

    /// Returns the public view of this account.
    pub fn profile(&self) -> UserProfile {
        UserProfile::from(self)
    }
}

/// Account data safe to hand out over the API (no password hash).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub dob: NaiveDate,
    pub telegram_connected: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&UserAccount> for UserProfile {
    fn from(user: &UserAccount) -> Self {
        Self {
            username: user.username.clone(),
            dob: user.dob,
            telegram_connected: user.telegram_connected,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dob() -> NaiveDate {
        NaiveDate::from_ymd_opt(1990, 4, 12).unwrap()
    }

    #[test]
    fn test_new_account_is_not_connected() {
        let user = UserAccount::new("alice", "$2b$10$hash", dob());
        assert_eq!(user.username, "alice");
        assert!(!user.telegram_connected);
    }

    #[test]
    fn test_account_file_format() {
        let user = UserAccount::new("alice", "$2b$10$hash", dob());
        let json = serde_json::to_value(&user).unwrap();

        assert_eq!(json["password"], "$2b$10$hash");
        assert_eq!(json["dob"], "1990-04-12");
        assert_eq!(json["telegramConnected"], false);
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_account_without_telegram_flag_parses() {
        let json = r#"{
            "username": "bob",
            "password": "hash",
            "dob": "1985-01-30",
            "createdAt": "2024-03-01T10:00:00Z"
        }"#;
        let user: UserAccount = serde_json::from_str(json).unwrap();
        assert_eq!(user.username, "bob");
        assert!(!user.telegram_connected);
    }

    #[test]
    fn test_profile_omits_hash() {
        let user = UserAccount::new("alice", "secret-hash", dob());
        let json = serde_json::to_string(&user.profile()).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("alice"));
    }
}
