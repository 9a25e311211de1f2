//! Per-contact message logs.

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Utc;
use relay_models::{ContactLog, ContactProfile, ContactSummary, IncomingMessage, IncomingSender, LoggedMessage};
use tracing::{error, info, warn};

use crate::atomic::{atomic_write_json, list_json_files, quarantine, read_json, read_json_optional};
use crate::error::{PersistenceError, Result};

/// Manages message logs, one JSON file per Telegram contact:
/// ```text
/// contacts/
/// ├── 123456789.json
/// └── 987654321.json
/// ```
pub struct ContactStore {
    dir: PathBuf,
    append_lock: Mutex<()>,
}

impl ContactStore {
    /// Creates a store rooted at the given contacts directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            append_lock: Mutex::new(()),
        }
    }

    fn contact_path(&self, id: i64) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    /// Records a message from a sender and refreshes their profile.
    pub fn append(&self, sender: &IncomingSender, message: &IncomingMessage) -> Result<ContactLog> {
        let _guard = self.append_lock.lock().unwrap_or_else(|e| e.into_inner());
        let path = self.contact_path(sender.id);
        let now = Utc::now();

        let mut log = match read_json_optional::<ContactLog>(&path) {
            Ok(Some(log)) => log,
            Ok(None) => ContactLog::new(sender, now),
            Err(PersistenceError::SerializeError(e)) => {
                match quarantine(&path) {
                    Ok(moved) => warn!(
                        user_id = sender.id,
                        error = %e,
                        moved_to = %moved.display(),
                        "Contact log was unreadable, starting a new one"
                    ),
                    Err(qe) => error!(user_id = sender.id, error = %qe, "Failed to move unreadable contact log"),
                }
                ContactLog::new(sender, now)
            }
            Err(e) => return Err(e),
        };

        log.profile = ContactProfile::from_sender(sender, now);
        log.messages.push(LoggedMessage::from(message));
        atomic_write_json(&path, &log)?;

        info!(
            user_id = sender.id,
            name = %sender.full_name(),
            messages = log.messages.len(),
            "Saved message"
        );
        Ok(log)
    }

    /// Loads a contact's log in stored (oldest first) order.
    pub fn load(&self, id: i64) -> Result<ContactLog> {
        read_json_optional(&self.contact_path(id))?
            .ok_or_else(|| PersistenceError::not_found("contact", id))
    }

    /// Loads a contact's log with the newest message first.
    pub fn load_newest_first(&self, id: i64) -> Result<ContactLog> {
        self.load(id).map(ContactLog::newest_first)
    }

    /// Summaries of every logged contact, most recently active first.
    ///
    /// Unreadable files are skipped.
    pub fn list_summaries(&self) -> Result<Vec<ContactSummary>> {
        let mut summaries = Vec::new();
        for path in list_json_files(&self.dir)? {
            match read_json::<ContactLog>(&path) {
                Ok(log) => summaries.push(ContactSummary::from(&log)),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable contact log"),
            }
        }
        summaries.sort_by(|a, b| b.last_message.cmp(&a.last_message).then(a.id.cmp(&b.id)));
        Ok(summaries)
    }

    /// Number of readable contact logs, matching [`Self::list_summaries`].
    pub fn count(&self) -> Result<usize> {
        Ok(self.list_summaries()?.len())
    }
}
