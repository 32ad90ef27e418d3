//! Cleaning transforms applied to every scraped string field.
//!
//! All transforms are pure and idempotent: `clean_text(clean_text(s)) ==
//! clean_text(s)`. Record-level cleaners drop records whose required fields
//! do not survive cleaning (empty names, too-short feedback).

use crate::types::{CommentRecord, CompetitorRecord, FeedbackRecord};

/// Smart punctuation and symbol codepoints mapped to ASCII-printable text.
const UNICODE_REPLACEMENTS: &[(char, &str)] = &[
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{2013}', "-"),
    ('\u{2014}', "-"),
    ('\u{2026}', "..."),
    ('\u{2022}', "*"),
    ('\u{2122}', "(tm)"),
    ('\u{00AE}', "(r)"),
    ('\u{00A9}', "(c)"),
    ('\u{00A0}', " "),
];

/// Clean one text field: strip HTML tags, convert escape sequences, map
/// smart punctuation to ASCII, normalize whitespace, trim.
///
/// Carriage returns and tabs never survive; runs of spaces collapse to one;
/// runs of 3+ newlines collapse to 2.
#[must_use]
pub fn clean_text(text: &str) -> String {
    let stripped = strip_tags(text);
    let unescaped = replace_escape_literals(&stripped);
    let mapped = map_unicode(&unescaped);
    let normalized = normalize_whitespace(&mapped);
    normalized.trim().to_string()
}

/// Remove `<...>` sequences while preserving the text between tags.
fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for ch in text.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

/// Convert literal two-character escape sequences (as they arrive from JSON
/// payloads and copy-pasted source text) into real whitespace.
fn replace_escape_literals(text: &str) -> String {
    text.replace("\\r\\n", "\n")
        .replace("\\n", "\n")
        .replace("\\r", "\n")
        .replace("\\t", " ")
}

fn map_unicode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match UNICODE_REPLACEMENTS.iter().find(|(from, _)| *from == ch) {
            Some((_, to)) => out.push_str(to),
            None => out.push(ch),
        }
    }
    out
}

/// Normalize control characters and collapse whitespace runs.
///
/// `\r\n` and `\r` become `\n`; tabs become spaces; other control characters
/// are dropped. Space runs collapse to a single space, newline runs cap at 2.
fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_spaces = 0usize;
    let mut pending_newlines = 0usize;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        let ch = match ch {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                '\n'
            }
            '\t' => ' ',
            c if c.is_control() && c != '\n' => continue,
            c => c,
        };

        if ch == '\n' {
            pending_spaces = 0;
            pending_newlines += 1;
        } else if ch == ' ' {
            pending_spaces += 1;
        } else {
            if pending_newlines > 0 {
                for _ in 0..pending_newlines.min(2) {
                    out.push('\n');
                }
            } else if pending_spaces > 0 && !out.is_empty() {
                out.push(' ');
            }
            pending_spaces = 0;
            pending_newlines = 0;
            out.push(ch);
        }
    }

    out
}

/// Validate and normalize a website URL. Adds `https://` when the scheme is
/// missing; rejects hosts without a dotted domain or with a TLD shorter than
/// 2 chars.
#[must_use]
pub fn clean_url(url: &str) -> Option<String> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return None;
    }
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let after_scheme = with_scheme.splitn(2, "://").nth(1)?;
    let host = after_scheme.split(['/', '?', '#']).next()?;
    let host = host.split('@').next_back()?.split(':').next()?;

    let parts: Vec<&str> = host.split('.').collect();
    if parts.len() < 2 || parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    if !parts.last().is_some_and(|tld| tld.len() >= 2) {
        return None;
    }
    Some(with_scheme)
}

/// Keep a revenue display string only if it plausibly describes money:
/// digits, currency symbols, or magnitude words.
#[must_use]
pub fn clean_revenue(revenue: &str) -> Option<String> {
    let cleaned = clean_text(revenue);
    if cleaned.is_empty() {
        return None;
    }
    let lower = cleaned.to_lowercase();
    let has_marker = cleaned.chars().any(|c| c.is_ascii_digit() || "$€£¥".contains(c))
        || ["million", "billion", "thousand", "k", "m", "b"]
            .iter()
            .any(|marker| lower.contains(marker));
    has_marker.then_some(cleaned)
}

fn clean_optional(field: Option<String>) -> Option<String> {
    field.map(|s| clean_text(&s)).filter(|s| !s.is_empty())
}

/// Clean one competitor record. Returns `None` when the name does not
/// survive cleaning (shorter than 2 chars) or provenance is missing.
#[must_use]
pub fn clean_competitor(mut competitor: CompetitorRecord) -> Option<CompetitorRecord> {
    let name = clean_text(&competitor.name);
    if name.chars().count() < 2 {
        return None;
    }
    if competitor.source.trim().is_empty() || competitor.source_url.trim().is_empty() {
        return None;
    }
    competitor.name = name;

    competitor.description = clean_optional(competitor.description)
        .filter(|d| d.chars().count() >= 10);
    competitor.website = competitor.website.as_deref().and_then(clean_url);
    competitor.estimated_users = clean_optional(competitor.estimated_users);
    competitor.estimated_revenue = competitor.estimated_revenue.as_deref().and_then(clean_revenue);
    competitor.pricing_model = clean_optional(competitor.pricing_model);
    competitor.founder_ceo = clean_optional(competitor.founder_ceo);
    competitor.launch_date = clean_optional(competitor.launch_date);
    competitor.source_url = clean_text(&competitor.source_url);
    competitor.confidence_score = competitor.confidence_score.clamp(0.0, 1.0);

    for comment in &mut competitor.comments {
        comment.text = clean_text(&comment.text);
        comment.author = clean_optional(comment.author.take());
    }

    Some(competitor)
}

/// Clean one feedback record. Returns `None` when the text does not survive
/// cleaning (shorter than 5 chars).
#[must_use]
pub fn clean_feedback_record(mut feedback: FeedbackRecord) -> Option<FeedbackRecord> {
    let text = clean_text(&feedback.text);
    if text.chars().count() < 5 {
        return None;
    }
    feedback.text = text;
    feedback.source_url = clean_text(&feedback.source_url);
    feedback.sentiment_score = feedback.sentiment_score.map(|s| s.clamp(-1.0, 1.0));
    Some(feedback)
}

/// Clean every competitor in the list, dropping records that do not survive.
#[must_use]
pub fn clean_competitors(competitors: Vec<CompetitorRecord>) -> Vec<CompetitorRecord> {
    competitors.into_iter().filter_map(clean_competitor).collect()
}

/// Clean every feedback record in the list, dropping records that do not
/// survive.
#[must_use]
pub fn clean_feedback(feedback: Vec<FeedbackRecord>) -> Vec<FeedbackRecord> {
    feedback.into_iter().filter_map(clean_feedback_record).collect()
}

/// Clean a list of comments in place (texts and authors).
pub fn clean_comments(comments: &mut [CommentRecord]) {
    for comment in comments {
        comment.text = clean_text(&comment.text);
        comment.author = clean_optional(comment.author.take());
    }
}
