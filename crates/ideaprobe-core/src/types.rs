use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Sentiment classification for one piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "positive"),
            SentimentLabel::Negative => write!(f, "negative"),
            SentimentLabel::Neutral => write!(f, "neutral"),
        }
    }
}

/// Outcome of a single source's scraping run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrapingStatus {
    Success,
    PartialSuccess,
    Failed,
}

/// A competitor surfaced by one source.
///
/// `comments` and `sentiment_summary` start empty; the orchestrator's
/// post-processing stage fills them in. Everything else is immutable after
/// the scraper emits the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitorRecord {
    pub name: String,
    pub description: Option<String>,
    pub website: Option<String>,
    /// Display string (e.g. "1M+"); sources report users in their own units.
    pub estimated_users: Option<String>,
    pub estimated_revenue: Option<String>,
    /// One of `Free`, `Freemium`, `Paid`, `Paid (<amount>)`, `Subscription`.
    pub pricing_model: Option<String>,
    /// Canonical name of the scraper that emitted this record.
    pub source: String,
    /// Per-record deep link back to the source.
    pub source_url: String,
    /// Scraper-assigned belief in [0, 1] that this is a genuine competitor.
    pub confidence_score: f64,
    pub launch_date: Option<String>,
    pub founder_ceo: Option<String>,
    pub review_count: Option<u64>,
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub comments: Vec<CommentRecord>,
    #[serde(default)]
    pub sentiment_summary: Option<SentimentSummary>,
}

impl CompetitorRecord {
    /// A record with only the required fields set.
    pub fn new(name: impl Into<String>, source: impl Into<String>, source_url: impl Into<String>, confidence_score: f64) -> Self {
        Self {
            name: name.into(),
            description: None,
            website: None,
            estimated_users: None,
            estimated_revenue: None,
            pricing_model: None,
            source: source.into(),
            source_url: source_url.into(),
            confidence_score,
            launch_date: None,
            founder_ceo: None,
            review_count: None,
            average_rating: None,
            comments: Vec::new(),
            sentiment_summary: None,
        }
    }
}

/// A user-feedback snippet surfaced by one source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub text: String,
    /// Filled by the analyzer during post-processing unless the source
    /// already provided a label.
    pub sentiment: Option<SentimentLabel>,
    pub sentiment_score: Option<f64>,
    pub source: String,
    pub source_url: String,
    /// Author name, date, and any platform-specific fields.
    #[serde(default)]
    pub author_info: BTreeMap<String, serde_json::Value>,
}

impl FeedbackRecord {
    pub fn new(text: impl Into<String>, source: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sentiment: None,
            sentiment_score: None,
            source: source.into(),
            source_url: source_url.into(),
            author_info: BTreeMap::new(),
        }
    }
}

/// A review or discussion item attached to a specific competitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRecord {
    pub text: String,
    pub author: Option<String>,
    pub date: Option<String>,
    pub rating: Option<i32>,
    /// Helpful-vote count from the source, used for ranking.
    pub helpfulness: Option<i64>,
    /// 1-based rank after the summary builder orders the list. 0 until assigned.
    #[serde(default)]
    pub position: usize,
    pub sentiment: Option<SentimentLabel>,
    pub sentiment_score: Option<f64>,
    pub sentiment_confidence: Option<f64>,
}

impl CommentRecord {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            author: None,
            date: None,
            rating: None,
            helpfulness: None,
            position: 0,
            sentiment: None,
            sentiment_score: None,
            sentiment_confidence: None,
        }
    }
}

/// A negative comment distilled into a pain-point row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PainPoint {
    /// Snippet of the comment text, at most 200 chars.
    pub text: String,
    pub author: Option<String>,
    pub rating: Option<i32>,
    pub confidence: f64,
    pub helpfulness: i64,
}

/// Per-competitor aggregation of labeled comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub total_comments: usize,
    pub positive_count: usize,
    pub negative_count: usize,
    pub neutral_count: usize,
    pub positive_percentage: f64,
    pub negative_percentage: f64,
    pub neutral_percentage: f64,
    /// Mean comment score, rounded to 4 decimal places.
    pub average_sentiment_score: f64,
    pub overall_sentiment: SentimentLabel,
    /// Top negative comments, worst first.
    pub pain_points: Vec<PainPoint>,
    /// Category name to short snippets; empty categories are omitted.
    pub pain_point_categories: BTreeMap<String, Vec<String>>,
    pub positive_feedback: Vec<String>,
    pub neutral_feedback: Vec<String>,
}

impl SentimentSummary {
    /// The canonical summary for a competitor with no comments.
    pub fn empty() -> Self {
        Self {
            total_comments: 0,
            positive_count: 0,
            negative_count: 0,
            neutral_count: 0,
            positive_percentage: 0.0,
            negative_percentage: 0.0,
            neutral_percentage: 0.0,
            average_sentiment_score: 0.0,
            overall_sentiment: SentimentLabel::Neutral,
            pain_points: Vec::new(),
            pain_point_categories: BTreeMap::new(),
            positive_feedback: Vec::new(),
            neutral_feedback: Vec::new(),
        }
    }
}

/// Cross-source aggregation of labeled feedback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackSummary {
    pub total_count: usize,
    pub positive_count: usize,
    pub negative_count: usize,
    pub neutral_count: usize,
    pub positive_percentage: f64,
    pub negative_percentage: f64,
    pub neutral_percentage: f64,
    /// Mean feedback score, rounded to 4 decimal places.
    pub average_score: f64,
    /// Mean analyzer confidence, rounded to 3 decimal places.
    pub average_confidence: f64,
    pub overall_sentiment: SentimentLabel,
    pub pain_point_categories: BTreeMap<String, Vec<String>>,
}

impl FeedbackSummary {
    pub fn empty() -> Self {
        Self {
            total_count: 0,
            positive_count: 0,
            negative_count: 0,
            neutral_count: 0,
            positive_percentage: 0.0,
            negative_percentage: 0.0,
            neutral_percentage: 0.0,
            average_score: 0.0,
            average_confidence: 0.0,
            overall_sentiment: SentimentLabel::Neutral,
            pain_point_categories: BTreeMap::new(),
        }
    }
}

/// Per-source diagnostics carried back to the orchestrator.
///
/// The named counters are the closed key set the orchestrator understands;
/// anything scraper-specific goes in `extras` and is passed through untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceMetadata {
    pub queries_attempted: Vec<String>,
    pub successful_queries: u32,
    pub failed_queries: u32,
    pub api_calls_made: u32,
    pub records_found: u32,
    pub reviews_extracted: u32,
    #[serde(default)]
    pub extras: BTreeMap<String, serde_json::Value>,
}

/// What one source's `scrape` returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapingResult {
    pub status: ScrapingStatus,
    pub competitors: Vec<CompetitorRecord>,
    pub feedback: Vec<FeedbackRecord>,
    pub error_message: Option<String>,
    pub metadata: SourceMetadata,
}

impl ScrapingResult {
    /// A hard failure carrying only an error message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: ScrapingStatus::Failed,
            competitors: Vec::new(),
            feedback: Vec::new(),
            error_message: Some(message.into()),
            metadata: SourceMetadata::default(),
        }
    }
}

/// A source that failed outright, with the reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFailure {
    pub source: String,
    pub error: String,
}

/// A source that returned partial results, with the informational message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceWarning {
    pub source: String,
    pub message: String,
}

/// Coverage metadata for one orchestrated run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    pub job_id: String,
    pub processing_time_seconds: f64,
    pub sources_attempted: usize,
    pub sources_successful: usize,
    pub sources_partial: usize,
    pub sources_failed: usize,
    pub successful_sources: Vec<String>,
    pub partial_sources: Vec<SourceWarning>,
    pub failed_sources: Vec<SourceFailure>,
    pub total_competitors_found: usize,
    pub total_feedback_found: usize,
    /// RFC 3339 UTC timestamp of when the run finished.
    pub completed_at: String,
    /// Set only when the run as a whole could not proceed (e.g. no scrapers
    /// registered); per-source failures live in `failed_sources`.
    pub error: Option<String>,
}

/// The orchestrator's sole produced artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedResult {
    pub competitors: Vec<CompetitorRecord>,
    pub feedback: Vec<FeedbackRecord>,
    pub sentiment_summary: FeedbackSummary,
    pub metadata: RunMetadata,
}
