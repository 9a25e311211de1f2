//! Runtime configuration for tg-relay.
//!
//! Values come from the process environment (after the `.env` file has been
//! loaded by the binary), with defaults for everything but the bot token.
//!
//! # Storage Structure
//!
//! ```text
//! ~/.tg-relay/data/
//! ├── users/              # operator accounts
//! ├── contacts/           # per-contact message logs
//! └── knowledge-base.json
//! ```
//!
//! # Environment Variables
//!
//! - `RELAY_DATA_DIR`: Override the data directory
//! - `RELAY_ENV_FILE`: `.env` file the bot token is persisted to
//! - `OLLAMA_API_URL`, `OLLAMA_MODEL`, `OLLAMA_TIMEOUT_SECS`: LLM endpoint
//! - `RELAY_ASSISTANT_NAME`, `RELAY_SUPPORT_URL`, `RELAY_WELCOME_MESSAGE`: reply texts
//! - `SESSION_TTL_HOURS`: Dashboard login lifetime
//! - `TELEGRAM_BOT_TOKEN`: Telegram credential
//! - `TELEGRAM_API_URL`: Bot API server, for self-hosted deployments

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;
use tracing::warn;

use crate::responder::ResponderSettings;

/// Environment variable for a custom data directory.
pub const DATA_DIR_ENV: &str = "RELAY_DATA_DIR";

/// Environment variable naming the `.env` file.
pub const ENV_FILE_ENV: &str = "RELAY_ENV_FILE";

pub const OLLAMA_URL_ENV: &str = "OLLAMA_API_URL";
pub const OLLAMA_MODEL_ENV: &str = "OLLAMA_MODEL";
pub const OLLAMA_TIMEOUT_ENV: &str = "OLLAMA_TIMEOUT_SECS";
pub const ASSISTANT_NAME_ENV: &str = "RELAY_ASSISTANT_NAME";
pub const SUPPORT_URL_ENV: &str = "RELAY_SUPPORT_URL";
pub const WELCOME_MESSAGE_ENV: &str = "RELAY_WELCOME_MESSAGE";
pub const SESSION_TTL_ENV: &str = "SESSION_TTL_HOURS";

/// Environment variable holding the Telegram bot token.
pub const BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

/// Environment variable overriding the Bot API server.
pub const TELEGRAM_API_URL_ENV: &str = "TELEGRAM_API_URL";

/// Default Ollama generate endpoint.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434/api/generate";

/// Default Ollama model.
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2:1b";

const DEFAULT_OLLAMA_TIMEOUT_SECS: u64 = 60;
const DEFAULT_SESSION_TTL_HOURS: u64 = 24;
const DEFAULT_ASSISTANT_NAME: &str = "Support";
const DEFAULT_STATE_DIR: &str = ".tg-relay";
const DEFAULT_ENV_FILE: &str = ".env";

// Layout under the data directory
const DATA_SUBDIR: &str = "data";
const USERS_SUBDIR: &str = "users";
const CONTACTS_SUBDIR: &str = "contacts";
const KNOWLEDGE_BASE_FILE: &str = "knowledge-base.json";

/// Expands `~` and environment references in a user-supplied path.
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::full(raw).map(|s| s.into_owned()).unwrap_or_else(|_| raw.to_string()))
}

/// Get the default data directory.
///
/// `~/.tg-relay/data`, or `.tg-relay/data` in the current directory when
/// no home directory is available.
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(DEFAULT_STATE_DIR))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
        .join(DATA_SUBDIR)
}

/// Resolved configuration for a tg-relay process.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Root of all JSON data files.
    pub data_dir: PathBuf,
    /// `.env` file the Telegram credential is written back to.
    pub env_file: PathBuf,
    /// Full URL of the Ollama generate endpoint.
    pub ollama_url: String,
    pub ollama_model: String,
    pub ollama_timeout: Duration,
    /// Name the assistant introduces itself with.
    pub assistant_name: String,
    /// Where unanswerable questions are referred to.
    pub support_url: Option<String>,
    /// Custom greeting for new conversations.
    pub welcome_message: Option<String>,
    /// Lifetime of a dashboard login.
    pub session_ttl: Duration,
    /// Telegram bot token, if configured.
    pub bot_token: Option<String>,
    /// Bot API server; `None` means api.telegram.org.
    pub telegram_api_url: Option<Url>,
}

impl RelayConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through an arbitrary lookup function.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let get_u64 = |key: &str, default: u64| {
            get(key).and_then(|v| v.parse::<u64>().ok()).unwrap_or(default)
        };

        Self {
            data_dir: get(DATA_DIR_ENV)
                .map(|p| expand_path(&p))
                .unwrap_or_else(default_data_dir),
            env_file: get(ENV_FILE_ENV)
                .map(|p| expand_path(&p))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ENV_FILE)),
            ollama_url: get(OLLAMA_URL_ENV).unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            ollama_model: get(OLLAMA_MODEL_ENV).unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
            ollama_timeout: Duration::from_secs(get_u64(OLLAMA_TIMEOUT_ENV, DEFAULT_OLLAMA_TIMEOUT_SECS)),
            assistant_name: get(ASSISTANT_NAME_ENV).unwrap_or_else(|| DEFAULT_ASSISTANT_NAME.to_string()),
            support_url: get(SUPPORT_URL_ENV),
            welcome_message: get(WELCOME_MESSAGE_ENV),
            session_ttl: Duration::from_secs(
                get_u64(SESSION_TTL_ENV, DEFAULT_SESSION_TTL_HOURS).saturating_mul(3600),
            ),
            bot_token: get(BOT_TOKEN_ENV),
            telegram_api_url: get(TELEGRAM_API_URL_ENV).and_then(|raw| match Url::parse(&raw) {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!(url = %raw, error = %e, "Ignoring invalid Telegram API URL");
                    None
                }
            }),
        }
    }

    /// Replaces the data directory.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Points the Telegram connection at another Bot API server.
    pub fn with_telegram_api_url(mut self, url: Url) -> Self {
        self.telegram_api_url = Some(url);
        self
    }

    /// Replaces the env file path.
    pub fn with_env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = path.into();
        self
    }

    /// Directory of operator account files.
    pub fn users_dir(&self) -> PathBuf {
        self.data_dir.join(USERS_SUBDIR)
    }

    /// Directory of per-contact message logs.
    pub fn contacts_dir(&self) -> PathBuf {
        self.data_dir.join(CONTACTS_SUBDIR)
    }

    /// The knowledge base file.
    pub fn knowledge_base_file(&self) -> PathBuf {
        self.data_dir.join(KNOWLEDGE_BASE_FILE)
    }

    /// Creates the data directory layout.
    ///
    /// # Errors
    /// Returns an error if any directory cannot be created.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.users_dir())?;
        std::fs::create_dir_all(self.contacts_dir())?;
        Ok(())
    }

    /// Reply texts for the auto-responder.
    pub fn responder_settings(&self) -> ResponderSettings {
        let mut settings = ResponderSettings::new(&self.assistant_name);
        if let Some(url) = &self.support_url {
            settings = settings.with_support_url(url);
        }
        if let Some(welcome) = &self.welcome_message {
            settings = settings.with_welcome_message(welcome);
        }
        settings
    }

    /// Returns the env file path.
    pub fn env_file(&self) -> &Path {
        &self.env_file
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RelayConfig::default();
        assert_eq!(config.ollama_url, DEFAULT_OLLAMA_URL);
        assert_eq!(config.ollama_model, DEFAULT_OLLAMA_MODEL);
        assert_eq!(config.ollama_timeout, Duration::from_secs(60));
        assert_eq!(config.session_ttl, Duration::from_secs(24 * 3600));
        assert_eq!(config.env_file, PathBuf::from(".env"));
        assert!(config.bot_token.is_none());
        assert!(config.data_dir.ends_with("data"));
    }

    #[test]
    fn test_overrides() {
        let config = RelayConfig::from_lookup(lookup(&[
            (DATA_DIR_ENV, "/srv/relay"),
            (OLLAMA_MODEL_ENV, "mistral"),
            (OLLAMA_TIMEOUT_ENV, "5"),
            (SESSION_TTL_ENV, "2"),
            (BOT_TOKEN_ENV, "123:abc"),
            (SUPPORT_URL_ENV, "https://help.example.org"),
        ]));

        assert_eq!(config.data_dir, PathBuf::from("/srv/relay"));
        assert_eq!(config.ollama_model, "mistral");
        assert_eq!(config.ollama_timeout, Duration::from_secs(5));
        assert_eq!(config.session_ttl, Duration::from_secs(7200));
        assert_eq!(config.bot_token.as_deref(), Some("123:abc"));
        assert_eq!(config.support_url.as_deref(), Some("https://help.example.org"));
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = RelayConfig::from_lookup(lookup(&[(BOT_TOKEN_ENV, ""), (OLLAMA_TIMEOUT_ENV, "soon")]));
        assert!(config.bot_token.is_none());
        assert_eq!(config.ollama_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_telegram_api_url() {
        let config = RelayConfig::from_lookup(lookup(&[(TELEGRAM_API_URL_ENV, "http://127.0.0.1:8081")]));
        assert_eq!(config.telegram_api_url.unwrap().as_str(), "http://127.0.0.1:8081/");

        let invalid = RelayConfig::from_lookup(lookup(&[(TELEGRAM_API_URL_ENV, "not a url")]));
        assert!(invalid.telegram_api_url.is_none());
        assert!(RelayConfig::default().telegram_api_url.is_none());
    }

    #[test]
    fn test_huge_session_ttl_saturates() {
        let hours = u64::MAX.to_string();
        let config = RelayConfig::from_lookup(lookup(&[(SESSION_TTL_ENV, hours.as_str())]));
        assert_eq!(config.session_ttl, Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_data_layout() {
        let config = RelayConfig::default().with_data_dir("/tmp/relay");
        assert_eq!(config.users_dir(), PathBuf::from("/tmp/relay/users"));
        assert_eq!(config.contacts_dir(), PathBuf::from("/tmp/relay/contacts"));
        assert_eq!(config.knowledge_base_file(), PathBuf::from("/tmp/relay/knowledge-base.json"));
    }

    #[test]
    fn test_ensure_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let config = RelayConfig::default().with_data_dir(dir.path().join("data"));
        config.ensure_dirs().unwrap();
        assert!(config.users_dir().is_dir());
        assert!(config.contacts_dir().is_dir());
    }

    #[test]
    fn test_expand_tilde() {
        let expanded = expand_path("~/relay");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expanded, home.join("relay"));
        }
    }
}
