//! Persistence layer for tg-relay.
//!
//! All state lives in plain JSON files under the data directory, written
//! atomically (temp file, then rename):
//!
//! ```text
//! data/
//! ├── users/<username>.json     # operator accounts
//! ├── contacts/<telegram-id>.json  # per-contact message logs
//! └── knowledge-base.json       # canned answers
//! ```
//!
//! # Example
//!
//! ```no_run
//! use relay_persistence::KnowledgeStore;
//! use relay_models::KnowledgeEntry;
//!
//! let store = KnowledgeStore::new("/var/lib/tg-relay/knowledge-base.json");
//! let entry = KnowledgeEntry::new("We are open 9-5", vec!["when are you open".into()], vec![]);
//! store.add(entry).unwrap();
//! assert_eq!(store.load().len(), 1);
//! ```

pub mod atomic;
pub mod contact_store;
pub mod error;
pub mod knowledge_store;
pub mod user_store;

pub use contact_store::ContactStore;
pub use error::{PersistenceError, Result};
pub use knowledge_store::KnowledgeStore;
pub use user_store::{validate_username, UserStore};
