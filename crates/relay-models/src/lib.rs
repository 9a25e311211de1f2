//! Core data models for tg-relay.
//!
//! This crate provides the plain data types shared by every tg-relay crate:
//! operator accounts, knowledge base entries, per-contact message logs and
//! auto-reply results. All of them serialize to the JSON files kept in the
//! data directory.

pub mod contact;
pub mod knowledge;
pub mod reply;
pub mod user;

// Re-export main types
pub use contact::{
    ContactLog, ContactProfile, ContactSummary, IncomingMessage, IncomingSender, LoggedMessage,
};
pub use knowledge::{parse_keywords, parse_questions, KnowledgeBase, KnowledgeEntry};
pub use reply::{ProcessedReply, ReplySource};
pub use user::{UserAccount, UserProfile};
