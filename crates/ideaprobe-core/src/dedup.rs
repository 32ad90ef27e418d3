//! First-wins deduplication for competitors and feedback.
//!
//! Both passes are insertion-stable and idempotent: running a pass twice
//! yields the same list.

use std::collections::HashSet;

use crate::types::{CompetitorRecord, FeedbackRecord};

/// Number of leading characters that identify a feedback text.
const FEEDBACK_KEY_CHARS: usize = 50;

/// Minimum feedback key length; shorter texts are dropped as noise.
const MIN_FEEDBACK_CHARS: usize = 10;

/// Deduplicate competitors by lowercased, trimmed name. First occurrence
/// wins; names shorter than 2 chars are dropped.
#[must_use]
pub fn dedup_competitors(competitors: Vec<CompetitorRecord>) -> Vec<CompetitorRecord> {
    let mut seen: HashSet<String> = HashSet::new();
    competitors
        .into_iter()
        .filter(|competitor| {
            let key = competitor.name.trim().to_lowercase();
            key.chars().count() >= 2 && seen.insert(key)
        })
        .collect()
}

/// Deduplicate feedback by the first 50 lowercased chars of the text. First
/// occurrence wins; texts shorter than 10 chars are dropped.
#[must_use]
pub fn dedup_feedback(feedback: Vec<FeedbackRecord>) -> Vec<FeedbackRecord> {
    let mut seen: HashSet<String> = HashSet::new();
    feedback
        .into_iter()
        .filter(|item| {
            let key: String = item
                .text
                .trim()
                .to_lowercase()
                .chars()
                .take(FEEDBACK_KEY_CHARS)
                .collect();
            key.chars().count() >= MIN_FEEDBACK_CHARS && seen.insert(key)
        })
        .collect()
}

/// Text key used by scrapers to merge review listings fetched under
/// different orderings before emission.
#[must_use]
pub fn text_key(text: &str) -> String {
    text.trim().to_lowercase().chars().take(FEEDBACK_KEY_CHARS).collect()
}
