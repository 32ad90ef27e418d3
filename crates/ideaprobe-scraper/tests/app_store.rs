//! HTTP-level tests for the App Store scraper against a mock iTunes API.

use ideaprobe_core::types::{CompetitorRecord, ScrapingStatus};
use ideaprobe_core::AppConfig;
use ideaprobe_scraper::{AppStoreScraper, SourceScraper};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config() -> AppConfig {
    AppConfig {
        log_level: "info".into(),
        user_agent: "ideaprobe-test".into(),
        max_concurrent_sources: 2,
        total_timeout_secs: 30,
        request_timeout_secs: 5,
        inter_query_delay_min_ms: 0,
        inter_query_delay_max_ms: 0,
        detail_fetch_pause_ms: 0,
        max_retries: 0,
        retry_backoff_base_secs: 0,
        max_keywords: 10,
    }
}

fn search_body() -> serde_json::Value {
    json!({
        "resultCount": 1,
        "results": [{
            "trackId": 42,
            "trackName": "FitTrack",
            "artistName": "FitTrack Labs",
            "price": 0.0,
            "formattedPrice": "Free",
            "trackViewUrl": "https://apps.apple.com/us/app/fittrack/id42",
            "averageUserRating": 4.2,
            "userRatingCount": 120
        }]
    })
}

fn lookup_body() -> serde_json::Value {
    json!({
        "resultCount": 1,
        "results": [{
            "trackId": 42,
            "trackName": "FitTrack",
            "artistName": "FitTrack Labs",
            "description": "Track workouts and monitor progress over time.",
            "price": 0.0,
            "formattedPrice": "Free",
            "trackViewUrl": "https://apps.apple.com/us/app/fittrack/id42",
            "sellerUrl": "https://fittrack.example.com",
            "averageUserRating": 4.2,
            "userRatingCount": 120,
            "features": ["iosUniversal"]
        }]
    })
}

fn review_feed_body() -> serde_json::Value {
    json!({
        "feed": {
            "entry": [
                {
                    "author": {"name": {"label": "sam"}},
                    "im:rating": {"label": "1"},
                    "title": {"label": "Crashes"},
                    "content": {"label": "keeps crashing every time I open a workout"},
                    "im:voteCount": {"label": "8"},
                    "updated": {"label": "2024-03-01T10:00:00-07:00"}
                },
                {
                    "author": {"name": {"label": "alex"}},
                    "im:rating": {"label": "5"},
                    "title": {"label": "Great"},
                    "content": {"label": "love the charts and the weekly summaries"},
                    "im:voteCount": {"label": "2"},
                    "updated": {"label": "2024-02-20T08:00:00-07:00"}
                }
            ]
        }
    })
}

async fn mount_reviews(server: &MockServer) {
    for order in ["mostrecent", "mosthelpful"] {
        Mock::given(method("GET"))
            .and(path(format!(
                "/us/rss/customerreviews/page=1/id=42/sortby={order}/json"
            )))
            .respond_with(ResponseTemplate::new(200).set_body_json(review_feed_body()))
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn scrape_success_collects_competitors_and_reviews() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/lookup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(lookup_body()))
        .mount(&server)
        .await;
    mount_reviews(&server).await;

    let scraper = AppStoreScraper::new(&test_config())
        .unwrap()
        .with_base_url(server.uri());
    let result = scraper
        .scrape(&["fitness".to_string()], "a fitness tracking idea")
        .await;

    assert_eq!(result.status, ScrapingStatus::Success);
    assert_eq!(result.metadata.failed_queries, 0);
    assert!(result.metadata.successful_queries > 0);

    assert_eq!(result.competitors.len(), 1, "same app deduped across queries");
    let competitor = &result.competitors[0];
    assert_eq!(competitor.name, "FitTrack");
    assert_eq!(competitor.source, "iOS App Store");
    assert_eq!(competitor.pricing_model.as_deref(), Some("Freemium"));
    assert_eq!(competitor.confidence_score, 0.9);
    assert_eq!(competitor.website.as_deref(), Some("https://fittrack.example.com"));
    assert!(competitor.description.is_some());

    assert!(!result.feedback.is_empty());
    let crash_review = result
        .feedback
        .iter()
        .find(|f| f.text.contains("crashing"))
        .expect("expected the crash review to survive");
    assert_eq!(
        crash_review.author_info.get("reviewer").and_then(|v| v.as_str()),
        Some("sam")
    );
}

#[tokio::test]
async fn scrape_partial_when_some_queries_fail() {
    let server = MockServer::start().await;
    // Only the bare keyword query succeeds; combination queries 500.
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("term", "fitness"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/lookup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(lookup_body()))
        .mount(&server)
        .await;
    mount_reviews(&server).await;

    let scraper = AppStoreScraper::new(&test_config())
        .unwrap()
        .with_base_url(server.uri());
    let result = scraper
        .scrape(&["fitness".to_string()], "a fitness tracking idea")
        .await;

    assert_eq!(result.status, ScrapingStatus::PartialSuccess);
    assert_eq!(result.metadata.successful_queries, 1);
    assert_eq!(result.metadata.failed_queries, 2);
    let message = result.error_message.expect("partial runs carry a message");
    assert!(message.contains("2 of 3"), "message was {message}");
    assert_eq!(result.competitors.len(), 1);
}

#[tokio::test]
async fn scrape_failed_when_every_query_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let scraper = AppStoreScraper::new(&test_config())
        .unwrap()
        .with_base_url(server.uri());
    let result = scraper
        .scrape(&["fitness".to_string()], "a fitness tracking idea")
        .await;

    assert_eq!(result.status, ScrapingStatus::Failed);
    assert!(result.competitors.is_empty());
    assert!(result.feedback.is_empty());
    let message = result.error_message.expect("failed runs carry a message");
    assert!(message.contains("all 3 queries failed"), "message was {message}");
}

#[tokio::test]
async fn scrape_counts_unparseable_body_as_query_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .mount(&server)
        .await;

    let scraper = AppStoreScraper::new(&test_config())
        .unwrap()
        .with_base_url(server.uri());
    let result = scraper
        .scrape(&["fitness".to_string()], "a fitness tracking idea")
        .await;

    assert_eq!(result.status, ScrapingStatus::Failed);
    assert_eq!(result.metadata.failed_queries, 3);
}

#[tokio::test]
async fn detail_comments_fetched_and_ranked_for_competitor() {
    let server = MockServer::start().await;
    mount_reviews(&server).await;

    let scraper = AppStoreScraper::new(&test_config())
        .unwrap()
        .with_base_url(server.uri());
    let competitor = CompetitorRecord::new(
        "FitTrack",
        "iOS App Store",
        "https://apps.apple.com/us/app/fittrack/id42",
        0.9,
    );
    let comments = scraper.fetch_detail_comments(&competitor).await;

    assert_eq!(comments.len(), 2, "two orderings dedup to two unique reviews");
    // Low-rated review first.
    assert_eq!(comments[0].rating, Some(1));
    assert_eq!(comments[0].helpfulness, Some(8));
    assert_eq!(comments[1].rating, Some(5));
}

#[tokio::test]
async fn detail_comments_without_app_id_return_empty() {
    let scraper = AppStoreScraper::new(&test_config()).unwrap();
    let competitor = CompetitorRecord::new("NoId", "iOS App Store", "https://example.com/x", 0.8);
    let comments = scraper.fetch_detail_comments(&competitor).await;
    assert!(comments.is_empty());
}

#[test]
fn validate_config_accepts_defaults() {
    let scraper = AppStoreScraper::new(&test_config()).unwrap();
    assert!(scraper.validate_config());
    assert_eq!(scraper.name(), "iOS App Store");
}
