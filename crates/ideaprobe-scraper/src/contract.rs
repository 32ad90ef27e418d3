//! The contract every data-source scraper implements.

use async_trait::async_trait;
use ideaprobe_core::types::{CommentRecord, CompetitorRecord, ScrapingResult};

/// One external data source (app store, discussion board, product
/// directory, ...).
///
/// Implementations are independent: they share no mutable state with one
/// another or the orchestrator beyond the returned value, and they are
/// driven concurrently under the orchestrator's semaphore.
#[async_trait]
pub trait SourceScraper: Send + Sync {
    /// Human identifier used in run metadata. Stable across runs.
    fn name(&self) -> &str;

    /// Whether the scraper's configuration (limits, country lists, keys) is
    /// present and coherent. Checked at registration; failures are logged
    /// and the scraper is skipped.
    fn validate_config(&self) -> bool;

    /// Scrape the source for the given keywords and idea text.
    ///
    /// Expected failures (rate limits, 404s, empty result sets) must be
    /// encoded in the returned [`ScrapingResult`], not panicked on. The
    /// orchestrator treats a panic as a source-level crash and buckets the
    /// source as failed.
    async fn scrape(&self, keywords: &[String], idea_text: &str) -> ScrapingResult;

    /// Fetch per-entity discussion for one competitor (detail enrichment).
    ///
    /// Called by the orchestrator for a handful of top competitors after the
    /// fan-out phase. Must respect the source's rate limits and degrade to an
    /// empty list on failure.
    async fn fetch_detail_comments(&self, _competitor: &CompetitorRecord) -> Vec<CommentRecord> {
        Vec::new()
    }

    /// Release any held resources (HTTP sessions, browser instances). The
    /// orchestrator calls this for every registered scraper on shutdown.
    async fn close(&self) {}
}
