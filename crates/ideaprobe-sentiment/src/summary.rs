//! Cross-source and per-competitor sentiment aggregation.

use std::collections::BTreeMap;

use ideaprobe_core::types::{
    CommentRecord, CompetitorRecord, FeedbackRecord, FeedbackSummary, PainPoint, SentimentLabel,
    SentimentSummary,
};

use crate::analyzer::SentimentAnalyzer;

/// Maximum pain points carried per competitor.
const MAX_PAIN_POINTS: usize = 5;
/// Maximum positive/neutral highlight snippets per competitor.
const MAX_HIGHLIGHTS: usize = 2;
/// Pain-point snippet length in chars.
const PAIN_POINT_SNIPPET_CHARS: usize = 200;
/// Category snippet length in chars.
const CATEGORY_SNIPPET_CHARS: usize = 80;

/// Ordered pain-point categories and their trigger keywords. The first
/// category whose keyword matches wins; unmatched comments land in `other`.
const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    ("usability", &["confusing", "difficult", "hard to use", "complicated", "interface", "ui", "ux", "navigation"]),
    ("performance", &["slow", "crash", "freeze", "lag", "loading", "speed", "performance", "battery"]),
    ("features", &["missing", "lack", "need", "want", "feature", "functionality", "option"]),
    ("pricing", &["expensive", "price", "cost", "money", "subscription", "payment", "billing"]),
    ("support", &["support", "help", "customer service", "response", "contact"]),
    ("bugs", &["bug", "error", "broken", "issue", "problem", "glitch", "not working"]),
];

/// Fallback score magnitude when a source supplied a label without a score.
const DEFAULT_LABEL_SCORE: f64 = 0.5;

/// Builds sentiment summaries from labeled feedback and comments.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryBuilder {
    analyzer: SentimentAnalyzer,
}

impl SummaryBuilder {
    #[must_use]
    pub fn new(analyzer: SentimentAnalyzer) -> Self {
        Self { analyzer }
    }

    /// Aggregate feedback across all sources into counts, percentages, a
    /// rounded average score, and pain-point categories.
    ///
    /// Records without a stored label are analyzed on the fly; stored labels
    /// and scores are trusted as-is.
    #[must_use]
    pub fn feedback_summary(&self, feedback: &[FeedbackRecord]) -> FeedbackSummary {
        if feedback.is_empty() {
            return FeedbackSummary::empty();
        }

        let mut positive = 0usize;
        let mut negative = 0usize;
        let mut neutral = 0usize;
        let mut score_sum = 0.0_f64;
        let mut confidence_sum = 0.0_f64;
        let mut categories: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for item in feedback {
            let analyzed = self.analyzer.analyze(&item.text);
            let label = item.sentiment.unwrap_or(analyzed.label);
            let score = item.sentiment_score.unwrap_or(analyzed.score);

            match label {
                SentimentLabel::Positive => positive += 1,
                SentimentLabel::Negative => negative += 1,
                SentimentLabel::Neutral => neutral += 1,
            }
            score_sum += score;
            confidence_sum += analyzed.confidence;

            if label == SentimentLabel::Negative {
                categories
                    .entry(categorize(&item.text).to_string())
                    .or_default()
                    .push(snippet(&item.text, CATEGORY_SNIPPET_CHARS));
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let total = feedback.len() as f64;
        let average = round(score_sum / total, 4);

        FeedbackSummary {
            total_count: feedback.len(),
            positive_count: positive,
            negative_count: negative,
            neutral_count: neutral,
            positive_percentage: percentage(positive, feedback.len()),
            negative_percentage: percentage(negative, feedback.len()),
            neutral_percentage: percentage(neutral, feedback.len()),
            average_score: average,
            average_confidence: round(confidence_sum / total, 3),
            overall_sentiment: overall_label(average),
            pain_point_categories: categories,
        }
    }

    /// Attach comments to a competitor: label unlabeled comments, order the
    /// list (negatives, neutrals, positives; higher helpfulness then lower
    /// rating within a group), assign 1-based positions, and compute the
    /// per-competitor summary.
    pub fn attach_comments(&self, competitor: &mut CompetitorRecord, mut comments: Vec<CommentRecord>) {
        if comments.is_empty() {
            competitor.comments = Vec::new();
            competitor.sentiment_summary = Some(SentimentSummary::empty());
            return;
        }

        for comment in &mut comments {
            self.ensure_scored(comment);
        }

        comments.sort_by(|a, b| {
            group_rank(a.sentiment)
                .cmp(&group_rank(b.sentiment))
                .then(b.helpfulness.unwrap_or(0).cmp(&a.helpfulness.unwrap_or(0)))
                .then(a.rating.unwrap_or(i32::MAX).cmp(&b.rating.unwrap_or(i32::MAX)))
        });
        for (index, comment) in comments.iter_mut().enumerate() {
            comment.position = index + 1;
        }

        competitor.sentiment_summary = Some(comment_summary(&comments));
        competitor.comments = comments;
    }

    /// Fill in label, score, and confidence when the source did not provide
    /// them. Sources that labeled a comment keep their label; a missing
    /// score falls back to a fixed magnitude matching the label's sign.
    fn ensure_scored(&self, comment: &mut CommentRecord) {
        match comment.sentiment {
            None => {
                let analyzed = self.analyzer.analyze(&comment.text);
                comment.sentiment = Some(analyzed.label);
                comment.sentiment_score = Some(analyzed.score);
                comment.sentiment_confidence = Some(analyzed.confidence);
            }
            Some(label) => {
                if comment.sentiment_score.is_none() {
                    comment.sentiment_score = Some(match label {
                        SentimentLabel::Positive => DEFAULT_LABEL_SCORE,
                        SentimentLabel::Negative => -DEFAULT_LABEL_SCORE,
                        SentimentLabel::Neutral => 0.0,
                    });
                }
            }
        }
    }
}

/// Build the per-competitor summary from ordered, scored comments.
fn comment_summary(comments: &[CommentRecord]) -> SentimentSummary {
    if comments.is_empty() {
        return SentimentSummary::empty();
    }

    let mut positive = 0usize;
    let mut negative = 0usize;
    let mut neutral = 0usize;
    let mut score_sum = 0.0_f64;
    let mut categories: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut pain_points = Vec::new();
    let mut positive_feedback = Vec::new();
    let mut neutral_feedback = Vec::new();

    for comment in comments {
        let label = comment.sentiment.unwrap_or(SentimentLabel::Neutral);
        score_sum += comment.sentiment_score.unwrap_or(0.0);
        match label {
            SentimentLabel::Positive => {
                positive += 1;
                if positive_feedback.len() < MAX_HIGHLIGHTS {
                    positive_feedback.push(snippet(&comment.text, PAIN_POINT_SNIPPET_CHARS));
                }
            }
            SentimentLabel::Neutral => {
                neutral += 1;
                if neutral_feedback.len() < MAX_HIGHLIGHTS {
                    neutral_feedback.push(snippet(&comment.text, PAIN_POINT_SNIPPET_CHARS));
                }
            }
            SentimentLabel::Negative => {
                negative += 1;
                if pain_points.len() < MAX_PAIN_POINTS {
                    pain_points.push(PainPoint {
                        text: snippet(&comment.text, PAIN_POINT_SNIPPET_CHARS),
                        author: comment.author.clone(),
                        rating: comment.rating,
                        confidence: comment.sentiment_confidence.unwrap_or(0.0),
                        helpfulness: comment.helpfulness.unwrap_or(0),
                    });
                }
                categories
                    .entry(categorize(&comment.text).to_string())
                    .or_default()
                    .push(snippet(&comment.text, CATEGORY_SNIPPET_CHARS));
            }
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let average = round(score_sum / comments.len() as f64, 4);

    SentimentSummary {
        total_comments: comments.len(),
        positive_count: positive,
        negative_count: negative,
        neutral_count: neutral,
        positive_percentage: percentage(positive, comments.len()),
        negative_percentage: percentage(negative, comments.len()),
        neutral_percentage: percentage(neutral, comments.len()),
        average_sentiment_score: average,
        overall_sentiment: overall_label(average),
        pain_points,
        pain_point_categories: categories,
        positive_feedback,
        neutral_feedback,
    }
}

/// First matching category for a negative comment; `other` when nothing hits.
fn categorize(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    for (category, keywords) in CATEGORY_KEYWORDS {
        if keywords.iter().any(|kw| lower.contains(kw)) {
            return category;
        }
    }
    "other"
}

fn group_rank(label: Option<SentimentLabel>) -> u8 {
    match label {
        Some(SentimentLabel::Negative) => 0,
        Some(SentimentLabel::Neutral) | None => 1,
        Some(SentimentLabel::Positive) => 2,
    }
}

fn overall_label(average: f64) -> SentimentLabel {
    if average > 0.1 {
        SentimentLabel::Positive
    } else if average < -0.1 {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    round(count as f64 / total as f64 * 100.0, 2)
}

fn round(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

fn snippet(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(text: &str, label: SentimentLabel) -> CommentRecord {
        let mut c = CommentRecord::new(text);
        c.sentiment = Some(label);
        c
    }

    fn feedback(text: &str, label: SentimentLabel, score: f64) -> FeedbackRecord {
        let mut f = FeedbackRecord::new(text, "src", "url");
        f.sentiment = Some(label);
        f.sentiment_score = Some(score);
        f
    }

    #[test]
    fn empty_feedback_yields_canonical_empty_summary() {
        let builder = SummaryBuilder::default();
        let summary = builder.feedback_summary(&[]);
        assert_eq!(summary.total_count, 0);
        assert_eq!(summary.overall_sentiment, SentimentLabel::Neutral);
        assert_eq!(summary.average_score, 0.0);
    }

    #[test]
    fn feedback_counts_and_percentages() {
        let builder = SummaryBuilder::default();
        let items = vec![
            feedback("love it so much", SentimentLabel::Positive, 0.6),
            feedback("keeps crashing on me", SentimentLabel::Negative, -0.5),
            feedback("it exists and runs fine", SentimentLabel::Neutral, 0.0),
        ];
        let summary = builder.feedback_summary(&items);
        assert_eq!(summary.positive_count, 1);
        assert_eq!(summary.negative_count, 1);
        assert_eq!(summary.neutral_count, 1);
        let pct_sum =
            summary.positive_percentage + summary.negative_percentage + summary.neutral_percentage;
        assert!((pct_sum - 100.0).abs() <= 1.0, "percentages summed to {pct_sum}");
    }

    #[test]
    fn feedback_average_rounded_to_four_places() {
        let builder = SummaryBuilder::default();
        let items = vec![
            feedback("first item of feedback", SentimentLabel::Positive, 0.3333333),
            feedback("second item of feedback", SentimentLabel::Positive, 0.3333333),
            feedback("third item of feedback", SentimentLabel::Positive, 0.3333333),
        ];
        let summary = builder.feedback_summary(&items);
        assert_eq!(summary.average_score, 0.3333);
        assert_eq!(summary.overall_sentiment, SentimentLabel::Positive);
    }

    #[test]
    fn unlabeled_feedback_gets_analyzed() {
        let builder = SummaryBuilder::default();
        let items = vec![FeedbackRecord::new("I love this wonderful product", "src", "url")];
        let summary = builder.feedback_summary(&items);
        assert_eq!(summary.positive_count, 1);
    }

    #[test]
    fn negative_feedback_lands_in_categories() {
        let builder = SummaryBuilder::default();
        let items = vec![feedback("way too expensive for what it offers", SentimentLabel::Negative, -0.4)];
        let summary = builder.feedback_summary(&items);
        assert!(summary.pain_point_categories.contains_key("pricing"));
    }

    #[test]
    fn categorize_first_match_wins() {
        // "crash" (performance) appears before "bug" in the comment, but the
        // table order decides: usability is checked first, then performance.
        assert_eq!(categorize("the app crashes with a bug"), "performance");
        assert_eq!(categorize("confusing navigation that crashes"), "usability");
        assert_eq!(categorize("something unrelated entirely"), "other");
    }

    #[test]
    fn attach_orders_negatives_first() {
        let builder = SummaryBuilder::default();
        let mut competitor = CompetitorRecord::new("Alpha", "src", "url", 0.8);
        let comments = vec![
            comment("Love the new feature", SentimentLabel::Positive),
            comment("App keeps crashing when I open it", SentimentLabel::Negative),
            comment("It is an app that exists", SentimentLabel::Neutral),
            comment("Too expensive for what it offers", SentimentLabel::Negative),
        ];
        builder.attach_comments(&mut competitor, comments);

        let labels: Vec<SentimentLabel> = competitor
            .comments
            .iter()
            .map(|c| c.sentiment.unwrap())
            .collect();
        assert_eq!(
            labels,
            vec![
                SentimentLabel::Negative,
                SentimentLabel::Negative,
                SentimentLabel::Neutral,
                SentimentLabel::Positive
            ]
        );
        let positions: Vec<usize> = competitor.comments.iter().map(|c| c.position).collect();
        assert_eq!(positions, vec![1, 2, 3, 4]);
    }

    #[test]
    fn attach_orders_by_helpfulness_within_group() {
        let builder = SummaryBuilder::default();
        let mut competitor = CompetitorRecord::new("Alpha", "src", "url", 0.8);
        let mut low = comment("slow and broken thing", SentimentLabel::Negative);
        low.helpfulness = Some(2);
        let mut high = comment("crashes all the time", SentimentLabel::Negative);
        high.helpfulness = Some(9);
        builder.attach_comments(&mut competitor, vec![low, high]);
        assert_eq!(competitor.comments[0].helpfulness, Some(9));
    }

    #[test]
    fn attach_orders_by_lower_rating_on_helpfulness_tie() {
        let builder = SummaryBuilder::default();
        let mut competitor = CompetitorRecord::new("Alpha", "src", "url", 0.8);
        let mut three_star = comment("kind of slow honestly", SentimentLabel::Negative);
        three_star.rating = Some(3);
        let mut one_star = comment("totally broken for me", SentimentLabel::Negative);
        one_star.rating = Some(1);
        builder.attach_comments(&mut competitor, vec![three_star, one_star]);
        assert_eq!(competitor.comments[0].rating, Some(1));
    }

    #[test]
    fn attach_builds_pain_point_categories() {
        let builder = SummaryBuilder::default();
        let mut competitor = CompetitorRecord::new("Alpha", "src", "url", 0.8);
        let comments = vec![
            comment("App keeps crashing when I open it", SentimentLabel::Negative),
            comment("Too expensive for what it offers", SentimentLabel::Negative),
            comment("Confusing navigation", SentimentLabel::Negative),
            comment("Love the new feature", SentimentLabel::Positive),
        ];
        builder.attach_comments(&mut competitor, comments);

        let summary = competitor.sentiment_summary.as_ref().unwrap();
        assert!(!summary.pain_point_categories["performance"].is_empty());
        assert!(!summary.pain_point_categories["pricing"].is_empty());
        assert!(!summary.pain_point_categories["usability"].is_empty());
        assert!(summary.positive_feedback.iter().any(|s| s.contains("Love the new feature")));
        assert_eq!(summary.negative_count, 3);
        assert_eq!(summary.pain_points.len(), 3);
    }

    #[test]
    fn attach_with_no_comments_sets_empty_summary() {
        let builder = SummaryBuilder::default();
        let mut competitor = CompetitorRecord::new("Alpha", "src", "url", 0.8);
        builder.attach_comments(&mut competitor, Vec::new());
        let summary = competitor.sentiment_summary.as_ref().unwrap();
        assert_eq!(summary.total_comments, 0);
        assert!(competitor.comments.is_empty());
    }

    #[test]
    fn pain_points_capped_at_five() {
        let builder = SummaryBuilder::default();
        let mut competitor = CompetitorRecord::new("Alpha", "src", "url", 0.8);
        let comments: Vec<CommentRecord> = (0..8)
            .map(|i| comment(&format!("broken thing number {i}"), SentimentLabel::Negative))
            .collect();
        builder.attach_comments(&mut competitor, comments);
        let summary = competitor.sentiment_summary.as_ref().unwrap();
        assert_eq!(summary.pain_points.len(), 5);
        assert_eq!(summary.negative_count, 8);
    }

    #[test]
    fn pain_point_snippets_truncated() {
        let builder = SummaryBuilder::default();
        let mut competitor = CompetitorRecord::new("Alpha", "src", "url", 0.8);
        let long_text = format!("terrible {}", "x".repeat(400));
        builder.attach_comments(&mut competitor, vec![comment(&long_text, SentimentLabel::Negative)]);
        let summary = competitor.sentiment_summary.as_ref().unwrap();
        assert!(summary.pain_points[0].text.chars().count() <= 200);
        let category_snips = summary.pain_point_categories.values().next().unwrap();
        assert!(category_snips[0].chars().count() <= 80);
    }

    #[test]
    fn percentages_sum_within_one_of_hundred() {
        let builder = SummaryBuilder::default();
        let mut competitor = CompetitorRecord::new("Alpha", "src", "url", 0.8);
        let comments = vec![
            comment("broken broken broken", SentimentLabel::Negative),
            comment("neutral statement here", SentimentLabel::Neutral),
            comment("another neutral statement", SentimentLabel::Neutral),
        ];
        builder.attach_comments(&mut competitor, comments);
        let s = competitor.sentiment_summary.as_ref().unwrap();
        let sum = s.positive_percentage + s.negative_percentage + s.neutral_percentage;
        assert!((sum - 100.0).abs() <= 1.0, "sum was {sum}");
    }

    #[test]
    fn labeled_comment_without_score_gets_default_magnitude() {
        let builder = SummaryBuilder::default();
        let mut competitor = CompetitorRecord::new("Alpha", "src", "url", 0.8);
        builder.attach_comments(
            &mut competitor,
            vec![comment("pre-labeled by the source", SentimentLabel::Negative)],
        );
        assert_eq!(competitor.comments[0].sentiment_score, Some(-0.5));
        let summary = competitor.sentiment_summary.as_ref().unwrap();
        assert_eq!(summary.overall_sentiment, SentimentLabel::Negative);
    }
}
