//! Per-contact message log types.
//!
//! Every Telegram user who writes to the connected account gets one
//! `contacts/<id>.json` file holding their latest profile data and the
//! full list of messages received from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The sender of an incoming direct message, as reported by Telegram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingSender {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub phone: Option<String>,
}

impl IncomingSender {
    /// Creates a sender with only an ID.
    pub fn new(id: i64) -> Self {
        Self {
            id,
            first_name: None,
            last_name: None,
            username: None,
            phone: None,
        }
    }

    /// Sets the first name.
    pub fn with_first_name(mut self, name: impl Into<String>) -> Self {
        self.first_name = Some(name.into());
        self
    }

    /// Sets the last name.
    pub fn with_last_name(mut self, name: impl Into<String>) -> Self {
        self.last_name = Some(name.into());
        self
    }

    /// Sets the username.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// "First Last", trimmed. Empty when neither name is known.
    pub fn full_name(&self) -> String {
        join_names(self.first_name.as_deref(), self.last_name.as_deref())
    }
}

/// An incoming direct message, independent of the Telegram SDK types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub id: i64,
    /// Message text or media caption, empty for bare media.
    pub text: String,
    pub date: DateTime<Utc>,
    /// Name of the attached media kind, if any (e.g. "photo").
    pub media_type: Option<String>,
}

impl IncomingMessage {
    /// Creates a plain text message.
    pub fn text(id: i64, text: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            id,
            text: text.into(),
            date,
            media_type: None,
        }
    }

    /// Marks the message as carrying media.
    pub fn with_media(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }
}

/// Stored profile of a contact, refreshed on every message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactProfile {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub last_updated: DateTime<Utc>,
}

impl ContactProfile {
    /// Builds a profile snapshot from a sender.
    pub fn from_sender(sender: &IncomingSender, now: DateTime<Utc>) -> Self {
        Self {
            id: sender.id,
            first_name: sender.first_name.clone(),
            last_name: sender.last_name.clone(),
            username: sender.username.clone(),
            phone: sender.phone.clone(),
            last_updated: now,
        }
    }
}

/// A logged message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedMessage {
    pub id: i64,
    #[serde(default)]
    pub text: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub media: bool,
    #[serde(default)]
    pub media_type: Option<String>,
}

impl From<&IncomingMessage> for LoggedMessage {
    fn from(msg: &IncomingMessage) -> Self {
        Self {
            id: msg.id,
            text: msg.text.clone(),
            date: msg.date,
            media: msg.media_type.is_some(),
            media_type: msg.media_type.clone(),
        }
    }
}

/// Full log file for one contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactLog {
    pub profile: ContactProfile,
    #[serde(default)]
    pub messages: Vec<LoggedMessage>,
}

impl ContactLog {
    /// Starts an empty log for a sender.
    pub fn new(sender: &IncomingSender, now: DateTime<Utc>) -> Self {
        Self {
            profile: ContactProfile::from_sender(sender, now),
            messages: Vec::new(),
        }
    }

    /// Display name, falling back to "Unnamed".
    pub fn display_name(&self) -> String {
        let name = join_names(
            self.profile.first_name.as_deref(),
            self.profile.last_name.as_deref(),
        );
        if name.is_empty() {
            "Unnamed".to_string()
        } else {
            name
        }
    }

    /// Date of the most recent message.
    pub fn last_message_at(&self) -> Option<DateTime<Utc>> {
        self.messages.last().map(|m| m.date)
    }

    /// Returns a copy with messages ordered newest first.
    pub fn newest_first(mut self) -> Self {
        self.messages.reverse();
        self
    }
}

/// One row in the monitor's contact list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactSummary {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub message_count: usize,
    pub last_message: Option<DateTime<Utc>>,
}

impl From<&ContactLog> for ContactSummary {
    fn from(log: &ContactLog) -> Self {
        Self {
            id: log.profile.id,
            name: log.display_name(),
            username: log
                .profile
                .username
                .clone()
                .unwrap_or_else(|| "No username".to_string()),
            message_count: log.messages.len(),
            last_message: log.last_message_at(),
        }
    }
}

fn join_names(first: Option<&str>, last: Option<&str>) -> String {
    format!("{} {}", first.unwrap_or(""), last.unwrap_or(""))
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_display_name_fallbacks() {
        let sender = IncomingSender::new(7);
        let mut log = ContactLog::new(&sender, at(0));
        assert_eq!(log.display_name(), "Unnamed");

        log.profile.last_name = Some("Smith".into());
        assert_eq!(log.display_name(), "Smith");

        log.profile.first_name = Some("Ann".into());
        assert_eq!(log.display_name(), "Ann Smith");
    }

    #[test]
    fn test_summary_from_log() {
        let sender = IncomingSender::new(42).with_first_name("Ann");
        let mut log = ContactLog::new(&sender, at(0));
        log.messages.push(LoggedMessage::from(&IncomingMessage::text(1, "hi", at(10))));
        log.messages.push(LoggedMessage::from(&IncomingMessage::text(2, "again", at(20))));

        let summary = ContactSummary::from(&log);
        assert_eq!(summary.id, 42);
        assert_eq!(summary.name, "Ann");
        assert_eq!(summary.username, "No username");
        assert_eq!(summary.message_count, 2);
        assert_eq!(summary.last_message, Some(at(20)));
    }

    #[test]
    fn test_logged_message_media_flag() {
        let msg = IncomingMessage::text(3, "", at(5)).with_media("photo");
        let logged = LoggedMessage::from(&msg);
        assert!(logged.media);
        assert_eq!(logged.media_type.as_deref(), Some("photo"));

        let json = serde_json::to_value(&logged).unwrap();
        assert_eq!(json["mediaType"], "photo");
    }

    #[test]
    fn test_newest_first() {
        let sender = IncomingSender::new(1);
        let mut log = ContactLog::new(&sender, at(0));
        log.messages.push(LoggedMessage::from(&IncomingMessage::text(1, "first", at(1))));
        log.messages.push(LoggedMessage::from(&IncomingMessage::text(2, "second", at(2))));

        let log = log.newest_first();
        assert_eq!(log.messages[0].text, "second");
    }
}
