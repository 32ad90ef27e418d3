//! Core domain types and pure transforms for ideaprobe.
//!
//! Holds the record shapes shared by scrapers, the orchestrator, and the
//! sentiment pipeline, plus the keyword extractor, data cleaner, and
//! deduplicator. The transforms are pure, deterministic, and side-effect
//! free.

pub mod app_config;
pub mod clean;
pub mod config;
pub mod dedup;
pub mod error;
pub mod keywords;
pub mod types;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
pub use keywords::extract_keywords;
pub use types::{
    AggregatedResult, CommentRecord, CompetitorRecord, FeedbackRecord, FeedbackSummary,
    PainPoint, RunMetadata, ScrapingResult, ScrapingStatus, SentimentLabel, SentimentSummary,
    SourceFailure, SourceMetadata, SourceWarning,
};
