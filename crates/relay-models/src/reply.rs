//! Auto-reply result types.

use serde::{Deserialize, Serialize};

/// Where an automatic reply came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReplySource {
    /// Greeting sent at the start of a conversation.
    Welcome,
    /// Matched a knowledge base entry.
    KnowledgeBase,
    /// Generated by the local LLM.
    Ollama,
    /// Fallback after a generation failure.
    Error,
}

impl ReplySource {
    /// Wire name of this source.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplySource::Welcome => "welcome",
            ReplySource::KnowledgeBase => "knowledge-base",
            ReplySource::Ollama => "ollama",
            ReplySource::Error => "error",
        }
    }
}

impl std::fmt::Display for ReplySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reply ready to be sent, tagged with its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedReply {
    pub response: String,
    pub source: ReplySource,
}

impl ProcessedReply {
    pub fn new(response: impl Into<String>, source: ReplySource) -> Self {
        Self {
            response: response.into(),
            source,
        }
    }
}
