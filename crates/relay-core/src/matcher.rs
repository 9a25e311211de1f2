//! Knowledge base matching.
//!
//! A three-tier heuristic, tried in order:
//!
//! 1. **Exact**: a stored question equal to the incoming one after normalization.
//! 2. **Keyword**: any entry keyword appearing as a substring of the question.
//! 3. **Overlap**: the stored question whose space-separated words mostly
//!    appear in the incoming one (more than half), best score wins.

use relay_models::KnowledgeBase;

/// Minimum share of a stored question's words that must appear in the input.
const OVERLAP_THRESHOLD: f64 = 0.5;

/// Lowercases and strips everything but letters, digits, `_` and whitespace.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect()
}

/// Share of `question`'s words found inside `normalized_input`.
///
/// Words are the lowercased question split on single spaces, punctuation
/// included, so `"hexa,"` never matches a normalized input. Returns `None`
/// for blank questions.
fn overlap_score(question: &str, normalized_input: &str) -> Option<f64> {
    if question.trim().is_empty() {
        return None;
    }
    let lowered = question.to_lowercase();
    let words: Vec<&str> = lowered.split(' ').collect();
    let hits = words.iter().filter(|w| normalized_input.contains(*w)).count();
    Some(hits as f64 / words.len() as f64)
}

/// Finds the best answer for a question, if any tier matches.
pub fn find_answer<'a>(question: &str, kb: &'a KnowledgeBase) -> Option<&'a str> {
    if kb.is_empty() {
        return None;
    }

    let input = normalize(question);

    // Tier 1: exact question match
    for entry in &kb.entries {
        if entry.questions.iter().any(|q| normalize(q) == input) {
            return Some(entry.answer.as_str());
        }
    }

    // Tier 2: keyword containment
    for entry in &kb.entries {
        if entry
            .keywords
            .iter()
            .filter(|k| !k.is_empty())
            .any(|k| input.contains(&k.to_lowercase()))
        {
            return Some(entry.answer.as_str());
        }
    }

    // Tier 3: word overlap
    let mut best: Option<(&str, f64)> = None;
    for entry in &kb.entries {
        for q in &entry.questions {
            let Some(score) = overlap_score(q, &input) else {
                continue;
            };
            let beats_best = best.map_or(true, |(_, top)| score > top);
            if score > OVERLAP_THRESHOLD && beats_best {
                best = Some((entry.answer.as_str(), score));
            }
        }
    }

    best.map(|(answer, _)| answer)
}
