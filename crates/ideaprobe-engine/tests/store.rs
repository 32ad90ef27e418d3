//! Persistence contract exercised with a recording in-memory store.

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use ideaprobe_core::types::{
    CompetitorRecord, FeedbackRecord, ScrapingResult, ScrapingStatus, SourceMetadata,
};
use ideaprobe_core::AppConfig;
use ideaprobe_engine::{persist, JobStatus, ScrapingService, Store, StoreError};
use ideaprobe_scraper::SourceScraper;

#[derive(Default)]
struct RecordingStore {
    calls: Mutex<Vec<String>>,
    statuses: Mutex<Vec<JobStatus>>,
}

#[async_trait]
impl Store for RecordingStore {
    async fn update_status(
        &self,
        _job_id: &str,
        status: JobStatus,
        _extra: Option<serde_json::Value>,
    ) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push("update_status".into());
        self.statuses.lock().unwrap().push(status);
        Ok(())
    }

    async fn insert_competitors(
        &self,
        _job_id: &str,
        competitors: &[CompetitorRecord],
    ) -> Result<(), StoreError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("insert_competitors:{}", competitors.len()));
        Ok(())
    }

    async fn insert_feedback(
        &self,
        _job_id: &str,
        feedback: &[FeedbackRecord],
    ) -> Result<(), StoreError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("insert_feedback:{}", feedback.len()));
        Ok(())
    }

    async fn insert_metadata(
        &self,
        _job_id: &str,
        metadata: serde_json::Value,
    ) -> Result<(), StoreError> {
        assert!(metadata.get("job_id").is_some());
        self.calls.lock().unwrap().push("insert_metadata".into());
        Ok(())
    }
}

struct OneCompetitorScraper;

#[async_trait]
impl SourceScraper for OneCompetitorScraper {
    fn name(&self) -> &str {
        "Fake"
    }
    fn validate_config(&self) -> bool {
        true
    }
    async fn scrape(&self, _keywords: &[String], _idea_text: &str) -> ScrapingResult {
        ScrapingResult {
            status: ScrapingStatus::Success,
            competitors: vec![CompetitorRecord::new("Alpha", "Fake", "u1", 0.8)],
            feedback: vec![],
            error_message: None,
            metadata: SourceMetadata::default(),
        }
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        log_level: "info".into(),
        user_agent: "ideaprobe-test".into(),
        max_concurrent_sources: 5,
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

#[tokio::test]
async fn persist_writes_records_then_final_status() {
    let mut service = ScrapingService::new(&test_config());
    service.register(Arc::new(OneCompetitorScraper));
    let result = service.scrape("an idea about alpha").await;

    let store = RecordingStore::default();
    persist(&store, &result).await.unwrap();

    let calls = store.calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![
            "update_status".to_string(),
            "insert_competitors:1".to_string(),
            "insert_feedback:0".to_string(),
            "insert_metadata".to_string(),
            "update_status".to_string(),
        ]
    );

    let statuses = store.statuses.lock().unwrap().clone();
    assert_eq!(statuses, vec![JobStatus::Processing, JobStatus::Completed]);
}
