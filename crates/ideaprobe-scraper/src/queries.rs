//! Search-query generation from extracted keywords.

/// Build a bounded, order-preserving set of search queries.
///
/// Top keywords go in as-is, then keyword + category pairs, then keyword +
/// domain suffix pairs. Duplicates are removed keeping the first occurrence;
/// the list is capped at `max_queries`. When no keywords are usable the
/// first few words of the idea text become a single fallback query.
#[must_use]
pub fn generate_search_queries(
    keywords: &[String],
    idea_text: &str,
    categories: &[&str],
    suffixes: &[&str],
    max_queries: usize,
) -> Vec<String> {
    let mut queries: Vec<String> = Vec::new();

    for keyword in keywords.iter().take(3) {
        if keyword.chars().count() > 2 {
            queries.push(keyword.clone());
        }
    }

    for keyword in keywords.iter().take(2) {
        for category in categories.iter().take(2) {
            if keyword != category {
                queries.push(format!("{keyword} {category}"));
            }
        }
    }

    for keyword in keywords.iter().take(2) {
        for suffix in suffixes {
            queries.push(format!("{keyword} {suffix}"));
        }
    }

    if queries.is_empty() {
        let fallback: Vec<&str> = idea_text.split_whitespace().take(4).collect();
        if !fallback.is_empty() {
            queries.push(fallback.join(" ").to_lowercase());
        }
    }

    let mut seen = std::collections::HashSet::new();
    queries.retain(|q| seen.insert(q.clone()));
    queries.truncate(max_queries);
    queries
}
