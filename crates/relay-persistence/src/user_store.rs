//! Operator account persistence.

use std::path::PathBuf;

use relay_models::UserAccount;
use tracing::debug;

use crate::atomic::{atomic_write_json, ensure_dir, read_json_optional};
use crate::error::{PersistenceError, Result};

/// Longest accepted username.
const MAX_USERNAME_LEN: usize = 64;

/// Stores one JSON file per operator account:
/// ```text
/// users/
/// ├── alice.json
/// └── bob.json
/// ```
pub struct UserStore {
    dir: PathBuf,
}

/// Checks that a username is safe to use as a file stem.
pub fn validate_username(username: &str) -> Result<()> {
    if username.is_empty() || username.len() > MAX_USERNAME_LEN {
        return Err(PersistenceError::InvalidData(format!(
            "username must be 1-{} characters",
            MAX_USERNAME_LEN
        )));
    }
    if username.starts_with('.') {
        return Err(PersistenceError::InvalidData(
            "username must not start with '.'".to_string(),
        ));
    }
    let valid = username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
    if !valid {
        return Err(PersistenceError::InvalidData(
            "username may only contain letters, digits, '_', '.' and '-'".to_string(),
        ));
    }
    Ok(())
}

impl UserStore {
    /// Creates a store rooted at the given users directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn user_path(&self, username: &str) -> PathBuf {
        self.dir.join(format!("{}.json", username))
    }

    /// Looks up an account. Unknown and invalid usernames are both `None`.
    pub fn find(&self, username: &str) -> Result<Option<UserAccount>> {
        if validate_username(username).is_err() {
            return Ok(None);
        }
        read_json_optional(&self.user_path(username))
    }

    /// Returns true if an account file exists for this username.
    pub fn exists(&self, username: &str) -> bool {
        validate_username(username).is_ok() && self.user_path(username).exists()
    }

    /// Writes an account, replacing any previous version.
    pub fn save(&self, user: &UserAccount) -> Result<()> {
        validate_username(&user.username)?;
        ensure_dir(&self.dir)?;
        atomic_write_json(&self.user_path(&user.username), user)?;
        debug!(username = %user.username, "Saved user");
        Ok(())
    }

    /// Updates the Telegram connection flag of an existing account.
    pub fn set_telegram_connected(&self, username: &str, connected: bool) -> Result<UserAccount> {
        let mut user = self
            .find(username)?
            .ok_or_else(|| PersistenceError::not_found("user", username))?;
        user.telegram_connected = connected;
        self.save(&user)?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn account(name: &str) -> UserAccount {
        UserAccount::new(name, "hash", NaiveDate::from_ymd_opt(1990, 1, 1).unwrap())
    }

    #[test]
    fn test_save_and_find() {
        let dir = tempdir().unwrap();
        let store = UserStore::new(dir.path().join("users"));

        assert!(store.find("alice").unwrap().is_none());
        assert!(!store.exists("alice"));

        store.save(&account("alice")).unwrap();

        let loaded = store.find("alice").unwrap().unwrap();
        assert_eq!(loaded.username, "alice");
        assert!(store.exists("alice"));
        assert!(dir.path().join("users/alice.json").exists());
    }

    #[test]
    fn test_set_telegram_connected() {
        let dir = tempdir().unwrap();
        let store = UserStore::new(dir.path());
        store.save(&account("alice")).unwrap();

        let updated = store.set_telegram_connected("alice", true).unwrap();
        assert!(updated.telegram_connected);
        assert!(store.find("alice").unwrap().unwrap().telegram_connected);

        let err = store.set_telegram_connected("ghost", true).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_rejects_path_like_usernames() {
        assert!(validate_username("../etc/passwd").is_err());
        assert!(validate_username(".hidden").is_err());
        assert!(validate_username("a b").is_err());
        assert!(validate_username("").is_err());
        assert!(validate_username(&"x".repeat(65)).is_err());
        assert!(validate_username("ops.team-1_a").is_ok());

        let dir = tempdir().unwrap();
        let store = UserStore::new(dir.path());
        assert!(store.find("../secret").unwrap().is_none());
        assert!(store.save(&account("../secret")).is_err());
    }
}
