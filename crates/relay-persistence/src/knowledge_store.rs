//! Knowledge base persistence.

use std::path::PathBuf;
use std::sync::Mutex;

use relay_models::{KnowledgeBase, KnowledgeEntry};
use tracing::{debug, warn};

use crate::atomic::{atomic_write_json, quarantine, read_json_optional};
use crate::error::{PersistenceError, Result};

/// Stores the whole knowledge base in a single `knowledge-base.json` file.
///
/// Mutations are read-modify-write cycles over that file and are serialized
/// through an internal lock.
pub struct KnowledgeStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl KnowledgeStore {
    /// Creates a store backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Loads the knowledge base.
    ///
    /// A missing or unparseable file yields an empty knowledge base.
    pub fn load(&self) -> KnowledgeBase {
        match read_json_optional::<KnowledgeBase>(&self.path) {
            Ok(Some(kb)) => kb,
            Ok(None) => KnowledgeBase::default(),
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "Failed to load knowledge base, using empty");
                KnowledgeBase::default()
            }
        }
    }

    /// Replaces the stored knowledge base.
    pub fn save(&self, kb: &KnowledgeBase) -> Result<()> {
        atomic_write_json(&self.path, kb)?;
        debug!(entries = kb.len(), "Saved knowledge base");
        Ok(())
    }

    /// Loads the knowledge base ahead of a mutation.
    ///
    /// An unparseable file is moved aside so the following save does not
    /// overwrite it. Read errors are returned.
    fn load_for_write(&self) -> Result<KnowledgeBase> {
        match read_json_optional::<KnowledgeBase>(&self.path) {
            Ok(kb) => Ok(kb.unwrap_or_default()),
            Err(PersistenceError::SerializeError(e)) => {
                let moved = quarantine(&self.path)?;
                warn!(
                    error = %e,
                    moved_to = %moved.display(),
                    "Knowledge base was unreadable, starting a new one"
                );
                Ok(KnowledgeBase::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Looks up an entry by ID.
    pub fn get(&self, id: &str) -> Option<KnowledgeEntry> {
        self.load().get(id).cloned()
    }

    /// Appends a new entry.
    pub fn add(&self, entry: KnowledgeEntry) -> Result<KnowledgeEntry> {
        let _guard = self.lock();
        let mut kb = self.load_for_write()?;
        kb.entries.push(entry.clone());
        self.save(&kb)?;
        Ok(entry)
    }

    /// Rewrites an existing entry's content.
    pub fn update(
        &self,
        id: &str,
        answer: &str,
        questions: Vec<String>,
        keywords: Vec<String>,
    ) -> Result<KnowledgeEntry> {
        let _guard = self.lock();
        let mut kb = self.load_for_write()?;
        let entry = kb
            .get_mut(id)
            .ok_or_else(|| PersistenceError::not_found("entry", id))?;
        entry.update(answer, questions, keywords);
        let updated = entry.clone();
        self.save(&kb)?;
        Ok(updated)
    }

    /// Removes an entry.
    pub fn delete(&self, id: &str) -> Result<KnowledgeEntry> {
        let _guard = self.lock();
        let mut kb = self.load_for_write()?;
        let removed = kb
            .remove(id)
            .ok_or_else(|| PersistenceError::not_found("entry", id))?;
        self.save(&kb)?;
        Ok(removed)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        // Writes are atomic, so a poisoned lock still guards a valid file
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn entry(answer: &str) -> KnowledgeEntry {
        KnowledgeEntry::new(answer, vec![format!("what is {}", answer)], vec![])
    }

    #[test]
    fn test_load_missing_is_empty() {
        let dir = tempdir().unwrap();
        let store = KnowledgeStore::new(dir.path().join("knowledge-base.json"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_load_invalid_json_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("knowledge-base.json");
        std::fs::write(&path, "[[[").unwrap();

        let store = KnowledgeStore::new(&path);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_write_over_invalid_json_keeps_old_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("knowledge-base.json");
        std::fs::write(&path, "[[[").unwrap();

        let store = KnowledgeStore::new(&path);
        store.add(entry("pricing")).unwrap();

        assert_eq!(store.load().len(), 1);
        let moved = dir.path().join("knowledge-base.json.corrupt");
        assert_eq!(std::fs::read_to_string(moved).unwrap(), "[[[");
    }

    #[test]
    fn test_add_update_delete() {
        let dir = tempdir().unwrap();
        let store = KnowledgeStore::new(dir.path().join("data/knowledge-base.json"));

        let added = store.add(entry("pricing")).unwrap();
        store.add(entry("setup")).unwrap();
        assert_eq!(store.load().len(), 2);

        let updated = store
            .update(&added.id, "It is free", vec!["is it free".into()], vec!["free".into()])
            .unwrap();
        assert_eq!(updated.id, added.id);
        assert_eq!(updated.created_at, added.created_at);
        assert_eq!(store.get(&added.id).unwrap().answer, "It is free");

        store.delete(&added.id).unwrap();
        assert!(store.get(&added.id).is_none());
        assert_eq!(store.load().len(), 1);
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let dir = tempdir().unwrap();
        let store = KnowledgeStore::new(dir.path().join("knowledge-base.json"));

        assert!(store.update("nope", "a", vec![], vec![]).unwrap_err().is_not_found());
        assert!(store.delete("nope").unwrap_err().is_not_found());
    }
}
