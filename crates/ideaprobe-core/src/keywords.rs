//! Search-keyword extraction from idea text.
//!
//! Pure and deterministic: the same idea text always yields the same ordered
//! keyword list. Ordering is significant; scrapers treat earlier keywords as
//! higher priority when building their query sets.

/// Common English stop words dropped before scoring.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is", "it",
    "its", "of", "on", "that", "the", "to", "was", "will", "with", "would", "could", "should",
    "can", "this", "these", "they", "them", "their", "there", "where", "when", "what", "who",
    "why", "how", "i", "you", "we", "my", "your", "our", "me", "us", "him", "her", "his", "hers",
    "ours", "yours", "theirs",
];

/// Business-domain terms boosted above plain frequency.
const BUSINESS_KEYWORDS: &[&str] = &[
    "saas", "software", "platform", "service", "app", "application", "tool", "solution", "system",
    "product", "business", "startup", "company", "enterprise", "customer", "user", "client",
    "market", "industry", "technology", "digital", "online", "web", "mobile", "automation",
    "analytics", "data", "ai", "artificial", "intelligence", "machine", "learning", "cloud",
    "api", "integration", "dashboard",
];

/// Extract up to `max_keywords` search keywords from idea text, best first.
///
/// Tokens are lowercased, split on whitespace and hyphens, and stripped of
/// punctuation. Score = occurrence count, doubled for business-domain terms
/// and multiplied by 1.5 for words longer than 6 chars. Ties keep
/// first-occurrence order.
#[must_use]
pub fn extract_keywords(idea_text: &str, max_keywords: usize) -> Vec<String> {
    if idea_text.trim().is_empty() {
        return Vec::new();
    }

    // (word, count, first-occurrence index), insertion ordered.
    let mut seen: Vec<(String, u32, usize)> = Vec::new();
    let mut index = 0usize;
    for raw in idea_text.split(|c: char| c.is_whitespace() || c == '-') {
        let word: String = raw
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        if word.len() <= 1 {
            continue;
        }
        match seen.iter_mut().find(|(w, _, _)| *w == word) {
            Some((_, count, _)) => *count += 1,
            None => {
                seen.push((word, 1, index));
                index += 1;
            }
        }
    }

    let mut scored: Vec<(String, f64, usize)> = seen
        .into_iter()
        .filter(|(word, _, _)| !STOP_WORDS.contains(&word.as_str()))
        .map(|(word, count, first)| {
            let mut score = f64::from(count);
            if BUSINESS_KEYWORDS.contains(&word.as_str()) {
                score *= 2.0;
            }
            if word.len() > 6 {
                score *= 1.5;
            }
            (word, score, first)
        })
        .collect();

    // Stable ordering: score descending, first occurrence as tie-break.
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then(a.2.cmp(&b.2)));

    scored.into_iter().take(max_keywords).map(|(word, _, _)| word).collect()
}
