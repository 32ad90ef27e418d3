/// Runtime configuration for a validation run.
///
/// Every field has a default; env vars override. See [`crate::load_app_config`].
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    /// User-Agent sent on every outbound request.
    pub user_agent: String,
    /// Semaphore capacity for the scraper fan-out.
    pub max_concurrent_sources: usize,
    /// Global deadline for one orchestrated run.
    pub total_timeout_secs: u64,
    /// Per-request HTTP timeout inside scrapers.
    pub request_timeout_secs: u64,
    /// Randomized pause between consecutive queries, drawn from
    /// `[inter_query_delay_min_ms, inter_query_delay_max_ms]`.
    pub inter_query_delay_min_ms: u64,
    pub inter_query_delay_max_ms: u64,
    /// Pause between detail-comment fetches during enrichment.
    pub detail_fetch_pause_ms: u64,
    /// Additional attempts after the first failure for retriable HTTP errors.
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
    /// Maximum keywords extracted from the idea text.
    pub max_keywords: usize,
}
