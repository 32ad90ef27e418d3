//! The scraping orchestrator: fan-out, aggregation, post-processing.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use ideaprobe_core::clean::{clean_comments, clean_competitors, clean_feedback};
use ideaprobe_core::dedup::{dedup_competitors, dedup_feedback};
use ideaprobe_core::extract_keywords;
use ideaprobe_core::types::{
    AggregatedResult, CompetitorRecord, FeedbackSummary, RunMetadata, ScrapingResult,
    ScrapingStatus, SourceFailure, SourceWarning,
};
use ideaprobe_core::AppConfig;
use ideaprobe_scraper::SourceScraper;
use ideaprobe_sentiment::{SentimentAnalyzer, SummaryBuilder};

/// Competitors whose detail comments are fetched during enrichment.
const DETAIL_ENRICH_CAP: usize = 3;

/// Orchestrates one validation run across every registered source.
///
/// Scrapers run as independent tasks under a counting semaphore and a single
/// global deadline. Each task reports back a `(name, ScrapingResult)` pair;
/// the orchestrator merges them sequentially, so no mutable state is shared
/// across tasks.
pub struct ScrapingService {
    scrapers: Vec<Arc<dyn SourceScraper>>,
    analyzer: SentimentAnalyzer,
    summary: SummaryBuilder,
    max_concurrent: usize,
    total_timeout: Duration,
    detail_pause: Duration,
    max_keywords: usize,
}

impl ScrapingService {
    #[must_use]
    pub fn new(config: &AppConfig) -> Self {
        let analyzer = SentimentAnalyzer::new();
        Self {
            scrapers: Vec::new(),
            analyzer,
            summary: SummaryBuilder::new(analyzer),
            max_concurrent: config.max_concurrent_sources,
            total_timeout: Duration::from_secs(config.total_timeout_secs),
            detail_pause: Duration::from_millis(config.detail_fetch_pause_ms),
            max_keywords: config.max_keywords,
        }
    }

    /// Register a scraper after validating its configuration. Invalid
    /// scrapers are logged and skipped; a name already registered is a no-op.
    pub fn register(&mut self, scraper: Arc<dyn SourceScraper>) {
        if !scraper.validate_config() {
            tracing::warn!(
                source = scraper.name(),
                "scraper failed config validation, not registering"
            );
            return;
        }
        if self.scrapers.iter().any(|s| s.name() == scraper.name()) {
            tracing::debug!(source = scraper.name(), "scraper already registered");
            return;
        }
        tracing::info!(source = scraper.name(), "registered scraper");
        self.scrapers.push(scraper);
    }

    /// Names of all registered sources, in registration order.
    #[must_use]
    pub fn sources(&self) -> Vec<String> {
        self.scrapers.iter().map(|s| s.name().to_string()).collect()
    }

    /// Release every registered scraper's resources.
    pub async fn close(&self) {
        for scraper in &self.scrapers {
            scraper.close().await;
        }
    }

    /// Run one validation: keyword extraction, concurrent fan-out,
    /// aggregation, and post-processing. Never returns an error; every
    /// failure mode is a field in the returned result.
    pub async fn scrape(&self, idea_text: &str) -> AggregatedResult {
        let started = std::time::Instant::now();
        let job_id = uuid::Uuid::new_v4().to_string();

        if self.scrapers.is_empty() {
            tracing::warn!(job_id = %job_id, "no scrapers registered");
            return self.empty_result(job_id, started, "No scrapers registered");
        }

        let keywords = extract_keywords(idea_text, self.max_keywords);
        tracing::info!(
            job_id = %job_id,
            sources = self.scrapers.len(),
            keywords = ?keywords,
            "starting scrape fan-out"
        );

        let outcomes = self.fan_out(&keywords, idea_text).await;

        // Merge sequentially in completion order.
        let mut all_competitors: Vec<CompetitorRecord> = Vec::new();
        let mut all_feedback = Vec::new();
        let mut successful_sources: Vec<String> = Vec::new();
        let mut partial_sources: Vec<SourceWarning> = Vec::new();
        let mut failed_sources: Vec<SourceFailure> = Vec::new();

        for (name, outcome) in outcomes {
            match outcome {
                Ok(result) => {
                    match result.status {
                        ScrapingStatus::Success => successful_sources.push(name),
                        ScrapingStatus::PartialSuccess => partial_sources.push(SourceWarning {
                            source: name,
                            message: result.error_message.clone().unwrap_or_default(),
                        }),
                        ScrapingStatus::Failed => failed_sources.push(SourceFailure {
                            source: name,
                            error: result
                                .error_message
                                .clone()
                                .unwrap_or_else(|| "unknown failure".to_string()),
                        }),
                    }
                    // Data is collected regardless of status.
                    all_competitors.extend(result.competitors);
                    all_feedback.extend(result.feedback);
                }
                Err(error) => failed_sources.push(SourceFailure { source: name, error }),
            }
        }

        // Post-processing runs on in-memory data, outside the deadline.
        let mut competitors = dedup_competitors(clean_competitors(all_competitors));
        let mut feedback = dedup_feedback(clean_feedback(all_feedback));

        self.enrich_competitors(&mut competitors).await;

        for item in &mut feedback {
            if item.sentiment.is_none() {
                let analyzed = self.analyzer.analyze(&item.text);
                item.sentiment = Some(analyzed.label);
                item.sentiment_score = Some(analyzed.score);
            }
        }
        let sentiment_summary = self.summary.feedback_summary(&feedback);

        let metadata = RunMetadata {
            job_id,
            processing_time_seconds: started.elapsed().as_secs_f64(),
            sources_attempted: self.scrapers.len(),
            sources_successful: successful_sources.len(),
            sources_partial: partial_sources.len(),
            sources_failed: failed_sources.len(),
            successful_sources,
            partial_sources,
            failed_sources,
            total_competitors_found: competitors.len(),
            total_feedback_found: feedback.len(),
            completed_at: chrono::Utc::now().to_rfc3339(),
            error: None,
        };

        tracing::info!(
            job_id = %metadata.job_id,
            successful = metadata.sources_successful,
            partial = metadata.sources_partial,
            failed = metadata.sources_failed,
            competitors = metadata.total_competitors_found,
            feedback = metadata.total_feedback_found,
            "scrape run completed"
        );

        AggregatedResult {
            competitors,
            feedback,
            sentiment_summary,
            metadata,
        }
    }

    /// Spawn one task per scraper under the semaphore and collect
    /// `(name, outcome)` pairs until every task finishes or the global
    /// deadline fires. On expiry, outstanding tasks are aborted and their
    /// sources reported as failed with `Timeout`.
    async fn fan_out(
        &self,
        keywords: &[String],
        idea_text: &str,
    ) -> Vec<(String, Result<ScrapingResult, String>)> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks: JoinSet<(String, ScrapingResult)> = JoinSet::new();
        let mut names_by_task: HashMap<tokio::task::Id, String> = HashMap::new();

        for scraper in &self.scrapers {
            let scraper = Arc::clone(scraper);
            let semaphore = Arc::clone(&semaphore);
            let keywords = keywords.to_vec();
            let idea = idea_text.to_string();
            let name = scraper.name().to_string();
            let handle = tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return (
                            scraper.name().to_string(),
                            ScrapingResult::failed("scheduler shut down"),
                        )
                    }
                };
                tracing::info!(source = scraper.name(), "scrape started");
                let result = scraper.scrape(&keywords, &idea).await;
                tracing::info!(source = scraper.name(), status = ?result.status, "scrape finished");
                (scraper.name().to_string(), result)
            });
            names_by_task.insert(handle.id(), name);
        }

        let deadline = tokio::time::Instant::now() + self.total_timeout;
        let mut outcomes: Vec<(String, Result<ScrapingResult, String>)> = Vec::new();
        let mut settled: HashSet<String> = HashSet::new();

        loop {
            match tokio::time::timeout_at(deadline, tasks.join_next_with_id()).await {
                Ok(Some(Ok((_, (name, result))))) => {
                    settled.insert(name.clone());
                    outcomes.push((name, Ok(result)));
                }
                Ok(Some(Err(join_err))) => {
                    let name = names_by_task
                        .get(&join_err.id())
                        .cloned()
                        .unwrap_or_else(|| "unknown".to_string());
                    let error = panic_message(join_err);
                    tracing::error!(source = %name, error = %error, "scraper task crashed");
                    settled.insert(name.clone());
                    outcomes.push((name, Err(error)));
                }
                Ok(None) => break,
                Err(_) => {
                    tracing::error!(
                        timeout_secs = self.total_timeout.as_secs(),
                        "global deadline reached, cancelling outstanding scrapers"
                    );
                    tasks.abort_all();
                    break;
                }
            }
        }

        for scraper in &self.scrapers {
            if !settled.contains(scraper.name()) {
                outcomes.push((scraper.name().to_string(), Err("Timeout".to_string())));
            }
        }

        outcomes
    }

    /// Fetch detail comments for up to [`DETAIL_ENRICH_CAP`] top competitors
    /// lacking comments, then compute every competitor's sentiment summary
    /// from whatever comments it ends up with.
    async fn enrich_competitors(&self, competitors: &mut [CompetitorRecord]) {
        let mut fetched = 0usize;
        for competitor in competitors.iter_mut() {
            if fetched >= DETAIL_ENRICH_CAP {
                break;
            }
            if !competitor.comments.is_empty() {
                continue;
            }
            let Some(scraper) = self
                .scrapers
                .iter()
                .find(|s| s.name() == competitor.source)
            else {
                continue;
            };
            if fetched > 0 {
                tokio::time::sleep(self.detail_pause).await;
            }
            let mut comments = scraper.fetch_detail_comments(competitor).await;
            clean_comments(&mut comments);
            fetched += 1;
            if !comments.is_empty() {
                tracing::debug!(
                    source = %competitor.source,
                    competitor = %competitor.name,
                    count = comments.len(),
                    "attached detail comments"
                );
            }
            competitor.comments = comments;
        }

        for competitor in competitors.iter_mut() {
            let existing = std::mem::take(&mut competitor.comments);
            self.summary.attach_comments(competitor, existing);
        }
    }

    fn empty_result(
        &self,
        job_id: String,
        started: std::time::Instant,
        error: &str,
    ) -> AggregatedResult {
        AggregatedResult {
            competitors: Vec::new(),
            feedback: Vec::new(),
            sentiment_summary: FeedbackSummary::empty(),
            metadata: RunMetadata {
                job_id,
                processing_time_seconds: started.elapsed().as_secs_f64(),
                sources_attempted: self.scrapers.len(),
                sources_successful: 0,
                sources_partial: 0,
                sources_failed: 0,
                successful_sources: Vec::new(),
                partial_sources: Vec::new(),
                failed_sources: Vec::new(),
                total_competitors_found: 0,
                total_feedback_found: 0,
                completed_at: chrono::Utc::now().to_rfc3339(),
                error: Some(error.to_string()),
            },
        }
    }
}

/// Best-effort extraction of a panic payload's message.
fn panic_message(join_err: tokio::task::JoinError) -> String {
    if join_err.is_panic() {
        let payload = join_err.into_panic();
        payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "scraper task panicked".to_string())
    } else {
        join_err.to_string()
    }
}
