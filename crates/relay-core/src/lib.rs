//! Core business logic for tg-relay.
//!
//! This crate holds everything between the Telegram transport and the HTTP
//! dashboard that does not touch either directly:
//!
//! - **config**: Environment-driven configuration and the data directory layout
//! - **env_file**: In-place `.env` updates for persisted credentials
//! - **matcher**: Knowledge base question matching
//! - **conversation**: Per-contact conversation state
//! - **ollama**: Local LLM client
//! - **responder**: The auto-reply pipeline and its toggles
//! - **delivery**: The outbound seam replies are sent through

pub mod config;
pub mod conversation;
pub mod delivery;
pub mod env_file;
pub mod matcher;
pub mod ollama;
pub mod responder;

pub use config::{default_data_dir, expand_path, RelayConfig};
pub use conversation::{ConversationState, ConversationTracker};
pub use delivery::{DeliveryError, ReplySender};
pub use env_file::upsert_env_var;
pub use matcher::{find_answer, normalize};
pub use ollama::{LanguageModel, OllamaClient, OllamaError};
pub use responder::{AutoResponder, ResponderSettings};
