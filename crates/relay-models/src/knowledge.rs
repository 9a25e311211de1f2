//! Knowledge base types.
//!
//! The knowledge base is a flat list of canned answers, each reachable by a
//! set of example questions and optional keywords.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The whole knowledge base file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    #[serde(default)]
    pub entries: Vec<KnowledgeEntry>,
}

impl KnowledgeBase {
    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Finds an entry by ID.
    pub fn get(&self, id: &str) -> Option<&KnowledgeEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Finds an entry by ID for mutation.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut KnowledgeEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    /// Removes an entry by ID, returning it if present.
    pub fn remove(&mut self, id: &str) -> Option<KnowledgeEntry> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(index))
    }
}

/// A single answer with the questions and keywords that lead to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeEntry {
    pub id: String,
    pub answer: String,
    pub questions: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl KnowledgeEntry {
    /// Creates a new entry with a fresh ID.
    pub fn new(answer: impl Into<String>, questions: Vec<String>, keywords: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            answer: answer.into(),
            questions,
            keywords,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the content of this entry, keeping its ID and creation time.
    pub fn update(&mut self, answer: impl Into<String>, questions: Vec<String>, keywords: Vec<String>) {
        self.answer = answer.into();
        self.questions = questions;
        self.keywords = keywords;
        self.updated_at = Utc::now();
    }
}

/// Splits newline-separated questions, trimming and dropping blank lines.
pub fn parse_questions(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_string)
        .collect()
}

/// Splits comma-separated keywords, trimming and dropping blanks.
pub fn parse_keywords(text: Option<&str>) -> Vec<String> {
    let Some(text) = text else {
        return Vec::new();
    };
    text.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}
