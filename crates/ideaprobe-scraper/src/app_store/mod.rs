//! iOS App Store scraper backed by the public iTunes JSON APIs.
//!
//! Searches `/search`, enriches top hits through `/lookup`, and pulls user
//! reviews from the customer-reviews feed under two orderings (most recent
//! and most helpful) to maximize pain-point coverage. All endpoints speak
//! JSON; no session or API key is required.

mod types;

use std::collections::HashSet;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use ideaprobe_core::clean::clean_text;
use ideaprobe_core::dedup::{dedup_competitors, dedup_feedback, text_key};
use ideaprobe_core::types::{
    CommentRecord, CompetitorRecord, FeedbackRecord, ScrapingResult, ScrapingStatus,
    SourceMetadata,
};
use ideaprobe_core::AppConfig;

use crate::client::build_http_client;
use crate::contract::SourceScraper;
use crate::error::ScraperError;
use crate::queries::generate_search_queries;
use crate::rate_limit::{query_pause, retry_with_backoff};

use types::{ItunesApp, ReviewFeedResponse, SearchResponse};

const SOURCE_NAME: &str = "iOS App Store";
const DEFAULT_BASE_URL: &str = "https://itunes.apple.com";

/// Store categories paired with keywords when generating queries.
const CATEGORIES: &[&str] = &["productivity", "business", "utilities", "lifestyle", "health", "fitness"];
/// Domain suffixes appended to top keywords.
const SUFFIXES: &[&str] = &["app", "ios"];
/// Review-feed orderings combined before ranking.
const REVIEW_ORDERS: &[&str] = &["mostrecent", "mosthelpful"];

/// Emission caps, matching what downstream consumers can usefully digest.
const MAX_COMPETITORS: usize = 15;
const MAX_FEEDBACK: usize = 20;

pub struct AppStoreScraper {
    client: Client,
    base_url: String,
    country: String,
    max_results_per_query: u32,
    max_queries: usize,
    max_reviews_per_entity: usize,
    /// Apps per query that get a `/lookup` detail call.
    detail_lookup_cap: usize,
    /// Apps per query whose review feeds are fetched.
    review_entity_cap: usize,
    delay_min_ms: u64,
    delay_max_ms: u64,
    detail_pause_ms: u64,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl AppStoreScraper {
    /// Builds the scraper from app configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &AppConfig) -> Result<Self, ScraperError> {
        let client = build_http_client(config.request_timeout_secs, &config.user_agent)?;
        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            country: "us".to_string(),
            max_results_per_query: 20,
            max_queries: 3,
            max_reviews_per_entity: 5,
            detail_lookup_cap: 5,
            review_entity_cap: 3,
            delay_min_ms: config.inter_query_delay_min_ms,
            delay_max_ms: config.inter_query_delay_max_ms,
            detail_pause_ms: config.detail_fetch_pause_ms,
            max_retries: config.max_retries,
            backoff_base_secs: config.retry_backoff_base_secs,
        })
    }

    /// Override the API origin. Used by tests to point at a mock server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url, ScraperError> {
        let raw = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        Url::parse(&raw).map_err(|e| ScraperError::InvalidUrl {
            url: raw,
            reason: e.to_string(),
        })
    }

    /// GET `url` and deserialize the JSON body, retrying transient failures.
    async fn fetch_json<T: DeserializeOwned>(&self, url: Url, context: &str) -> Result<T, ScraperError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            let context = context.to_owned();
            async move {
                let response = self.client.get(url.clone()).send().await?;
                let status = response.status();

                if status == StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(ScraperError::RateLimited {
                        domain: url.host_str().unwrap_or("unknown").to_owned(),
                        retry_after_secs,
                    });
                }
                if status == StatusCode::NOT_FOUND {
                    return Err(ScraperError::NotFound { url: url.to_string() });
                }
                if !status.is_success() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }

                let body = response.text().await?;
                serde_json::from_str::<T>(&body).map_err(|e| ScraperError::Deserialize {
                    context: context.clone(),
                    source: e,
                })
            }
        })
        .await
    }

    async fn search_apps(&self, query: &str) -> Result<Vec<ItunesApp>, ScraperError> {
        let mut url = self.endpoint("search")?;
        url.query_pairs_mut()
            .append_pair("term", query)
            .append_pair("media", "software")
            .append_pair("entity", "software")
            .append_pair("country", &self.country)
            .append_pair("limit", &self.max_results_per_query.to_string());
        let response: SearchResponse = self
            .fetch_json(url, &format!("app search for \"{query}\""))
            .await?;
        Ok(response.results)
    }

    async fn lookup_app(&self, app_id: i64) -> Result<Option<ItunesApp>, ScraperError> {
        let mut url = self.endpoint("lookup")?;
        url.query_pairs_mut()
            .append_pair("id", &app_id.to_string())
            .append_pair("country", &self.country);
        let response: SearchResponse = self
            .fetch_json(url, &format!("app lookup for {app_id}"))
            .await?;
        Ok(response.results.into_iter().next())
    }

    async fn fetch_review_feed(&self, app_id: i64, order: &str) -> Result<Vec<CommentRecord>, ScraperError> {
        let path = format!(
            "{}/rss/customerreviews/page=1/id={}/sortby={}/json",
            self.country, app_id, order
        );
        let url = self.endpoint(&path)?;
        let response: ReviewFeedResponse = self
            .fetch_json(url, &format!("review feed for {app_id}"))
            .await?;
        let entries = response.feed.map(|f| f.entry.into_vec()).unwrap_or_default();
        Ok(entries.into_iter().filter_map(comment_from_entry).collect())
    }

    /// Pull reviews under every configured ordering, merge by text key, and
    /// rank so low-rated, high-helpfulness reviews come first. Feed failures
    /// degrade to whatever the other orderings produced.
    async fn collect_reviews(&self, app_id: i64) -> Vec<CommentRecord> {
        let mut combined: Vec<CommentRecord> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for order in REVIEW_ORDERS {
            match self.fetch_review_feed(app_id, order).await {
                Ok(comments) => {
                    for comment in comments {
                        if seen.insert(text_key(&comment.text)) {
                            combined.push(comment);
                        }
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        source = SOURCE_NAME,
                        app_id,
                        order,
                        error = %e,
                        "review feed fetch failed"
                    );
                }
            }
        }

        rank_reviews(&mut combined, self.max_reviews_per_entity);
        combined
    }

    /// Run one search query, appending found competitors and feedback.
    async fn run_query(
        &self,
        query: &str,
        competitors: &mut Vec<CompetitorRecord>,
        feedback: &mut Vec<FeedbackRecord>,
        metadata: &mut SourceMetadata,
    ) -> Result<(), ScraperError> {
        let apps = self.search_apps(query).await?;
        metadata.api_calls_made += 1;
        tracing::info!(source = SOURCE_NAME, query, hits = apps.len(), "search completed");

        for (index, app) in apps.iter().enumerate() {
            let details = match app.track_id {
                Some(app_id) if index < self.detail_lookup_cap => {
                    tokio::time::sleep(std::time::Duration::from_millis(self.detail_pause_ms)).await;
                    match self.lookup_app(app_id).await {
                        Ok(details) => {
                            metadata.api_calls_made += 1;
                            details
                        }
                        Err(e) => {
                            tracing::debug!(source = SOURCE_NAME, app_id, error = %e, "lookup failed");
                            None
                        }
                    }
                }
                _ => None,
            };

            if let Some(competitor) = self.competitor_from(app, details.as_ref()) {
                competitors.push(competitor);
            }
        }

        for app in apps.iter().take(self.review_entity_cap) {
            let Some(app_id) = app.track_id else { continue };
            let reviews = self.collect_reviews(app_id).await;
            feedback.extend(self.feedback_from(app, &reviews));
            tokio::time::sleep(std::time::Duration::from_millis(self.detail_pause_ms)).await;
        }

        Ok(())
    }

    fn competitor_from(&self, app: &ItunesApp, details: Option<&ItunesApp>) -> Option<CompetitorRecord> {
        let name = clean_text(app.track_name.as_deref()?);
        if name.is_empty() {
            return None;
        }
        // Lookup results carry the richer field set when present.
        let merged = details.unwrap_or(app);
        let source_url = app
            .track_view_url
            .clone()
            .or_else(|| merged.track_view_url.clone())
            .or_else(|| {
                app.track_id
                    .map(|id| format!("https://apps.apple.com/{}/app/id{id}", self.country))
            })?;

        let mut competitor = CompetitorRecord::new(
            name,
            SOURCE_NAME,
            source_url,
            if details.is_some() { 0.9 } else { 0.8 },
        );
        competitor.description = merged
            .description
            .as_deref()
            .or(app.description.as_deref())
            .map(clean_text)
            .filter(|d| !d.is_empty());
        competitor.website = merged.seller_url.clone();
        competitor.pricing_model = Some(pricing_model(merged));
        competitor.launch_date = merged.release_date.clone();
        competitor.founder_ceo = merged.artist_name.as_deref().map(clean_text);
        competitor.review_count = merged.user_rating_count;
        competitor.average_rating = merged.average_user_rating.or(app.average_user_rating);
        Some(competitor)
    }

    fn feedback_from(&self, app: &ItunesApp, reviews: &[CommentRecord]) -> Vec<FeedbackRecord> {
        let app_name = app.track_name.as_deref().map(clean_text).unwrap_or_default();
        let source_url = app.track_view_url.clone().unwrap_or_else(|| {
            app.track_id
                .map(|id| format!("https://apps.apple.com/{}/app/id{id}", self.country))
                .unwrap_or_default()
        });

        reviews
            .iter()
            .map(|review| {
                let mut item = FeedbackRecord::new(review.text.clone(), SOURCE_NAME, source_url.clone());
                item.author_info.insert("app_name".into(), app_name.clone().into());
                if let Some(id) = app.track_id {
                    item.author_info.insert("app_id".into(), id.to_string().into());
                }
                if let Some(author) = &review.author {
                    item.author_info.insert("reviewer".into(), author.clone().into());
                }
                if let Some(date) = &review.date {
                    item.author_info.insert("review_date".into(), date.clone().into());
                }
                if let Some(rating) = review.rating {
                    item.author_info.insert("rating".into(), rating.into());
                }
                if let Some(votes) = review.helpfulness {
                    item.author_info.insert("helpful_votes".into(), votes.into());
                }
                item
            })
            .collect()
    }
}

#[async_trait]
impl SourceScraper for AppStoreScraper {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn validate_config(&self) -> bool {
        if self.max_results_per_query == 0 {
            tracing::error!(source = SOURCE_NAME, "max_results_per_query must be positive");
            return false;
        }
        if self.max_queries == 0 {
            tracing::error!(source = SOURCE_NAME, "max_queries must be positive");
            return false;
        }
        if self.country.is_empty() {
            tracing::error!(source = SOURCE_NAME, "no storefront country configured");
            return false;
        }
        if self.delay_max_ms < self.delay_min_ms {
            tracing::error!(source = SOURCE_NAME, "inter-query delay range is inverted");
            return false;
        }
        true
    }

    async fn scrape(&self, keywords: &[String], idea_text: &str) -> ScrapingResult {
        let queries = generate_search_queries(keywords, idea_text, CATEGORIES, SUFFIXES, self.max_queries);
        if queries.is_empty() {
            return ScrapingResult::failed("no search queries could be derived");
        }

        let mut metadata = SourceMetadata {
            queries_attempted: queries.clone(),
            ..SourceMetadata::default()
        };
        metadata
            .extras
            .insert("scraping_method".into(), "itunes-search-api".into());

        let mut competitors: Vec<CompetitorRecord> = Vec::new();
        let mut feedback: Vec<FeedbackRecord> = Vec::new();

        for (index, query) in queries.iter().enumerate() {
            if index > 0 {
                query_pause(self.delay_min_ms, self.delay_max_ms).await;
            }
            match self
                .run_query(query, &mut competitors, &mut feedback, &mut metadata)
                .await
            {
                Ok(()) => metadata.successful_queries += 1,
                Err(e) => {
                    tracing::warn!(source = SOURCE_NAME, query, error = %e, "query failed");
                    metadata.failed_queries += 1;
                }
            }
        }

        let mut competitors = dedup_competitors(competitors);
        competitors.truncate(MAX_COMPETITORS);
        let mut feedback = dedup_feedback(feedback);
        feedback.truncate(MAX_FEEDBACK);

        metadata.records_found = competitors.len() as u32;
        metadata.reviews_extracted = feedback.len() as u32;

        let attempted = queries.len() as u32;
        let (status, error_message) = if metadata.successful_queries == 0 {
            (
                ScrapingStatus::Failed,
                Some(format!("all {attempted} queries failed")),
            )
        } else if metadata.failed_queries > 0 {
            (
                ScrapingStatus::PartialSuccess,
                Some(format!(
                    "{} of {attempted} queries failed",
                    metadata.failed_queries
                )),
            )
        } else {
            (ScrapingStatus::Success, None)
        };

        tracing::info!(
            source = SOURCE_NAME,
            competitors = competitors.len(),
            feedback = feedback.len(),
            successful_queries = metadata.successful_queries,
            failed_queries = metadata.failed_queries,
            "scrape completed"
        );

        ScrapingResult {
            status,
            competitors,
            feedback,
            error_message,
            metadata,
        }
    }

    async fn fetch_detail_comments(&self, competitor: &CompetitorRecord) -> Vec<CommentRecord> {
        let Some(app_id) = parse_app_id(&competitor.source_url) else {
            tracing::debug!(
                source = SOURCE_NAME,
                url = %competitor.source_url,
                "no app id in source url, skipping detail fetch"
            );
            return Vec::new();
        };
        self.collect_reviews(app_id).await
    }
}

/// Convert one feed entry into a comment. Entries without a rating are the
/// feed's app-metadata header and are dropped.
fn comment_from_entry(entry: types::ReviewEntry) -> Option<CommentRecord> {
    let rating = entry.rating?.label.parse::<i32>().ok();
    let content = entry.content.map(|l| l.label).unwrap_or_default();
    let title = entry.title.map(|l| l.label).unwrap_or_default();
    let text = clean_text(&if title.is_empty() {
        content
    } else {
        format!("{title}. {content}")
    });
    if text.is_empty() {
        return None;
    }

    let mut comment = CommentRecord::new(text);
    comment.author = entry
        .author
        .and_then(|a| a.name)
        .map(|l| clean_text(&l.label))
        .filter(|a| !a.is_empty());
    comment.date = entry.updated.map(|l| l.label);
    comment.rating = rating;
    comment.helpfulness = entry.vote_count.and_then(|l| l.label.parse::<i64>().ok());
    Some(comment)
}

/// Rank reviews for emission: rating ascending, helpful votes descending,
/// then truncate. Low-rated, widely-endorsed complaints surface first.
fn rank_reviews(reviews: &mut Vec<CommentRecord>, cap: usize) {
    reviews.sort_by(|a, b| {
        a.rating
            .unwrap_or(i32::MAX)
            .cmp(&b.rating.unwrap_or(i32::MAX))
            .then(b.helpfulness.unwrap_or(0).cmp(&a.helpfulness.unwrap_or(0)))
    });
    reviews.truncate(cap);
}

/// Infer the pricing tag from store price data.
fn pricing_model(app: &ItunesApp) -> String {
    let free = app.price.unwrap_or(0.0) == 0.0
        || matches!(app.formatted_price.as_deref(), Some("Free") | Some("$0.00"));
    if free {
        if app.offers_in_app_purchases() {
            "Freemium".to_string()
        } else {
            "Free".to_string()
        }
    } else if let Some(formatted) = &app.formatted_price {
        format!("Paid ({formatted})")
    } else {
        "Paid".to_string()
    }
}

/// Extract the numeric app id from a store URL
/// (`https://apps.apple.com/us/app/name/id1234?uo=4` or `...?id=1234`).
fn parse_app_id(url: &str) -> Option<i64> {
    if let Some(pos) = url.rfind("/id") {
        let digits: String = url[pos + 3..]
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        if !digits.is_empty() {
            return digits.parse().ok();
        }
    }
    url.split(['?', '&'])
        .find_map(|part| part.strip_prefix("id="))
        .and_then(|v| v.parse().ok())
}
