//! Sentiment analysis for ideaprobe.
//!
//! Classifies feedback text with a lexicon-and-rules scorer and aggregates
//! labeled feedback into per-competitor and cross-source summaries,
//! including pain-point extraction and categorization.

pub mod analyzer;
pub mod summary;

pub use analyzer::{Sentiment, SentimentAnalyzer};
pub use summary::SummaryBuilder;
