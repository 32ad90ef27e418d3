//! Persistence contract consumed after a run completes.
//!
//! The orchestrator itself never touches storage; the surrounding system
//! implements [`Store`] and calls [`persist`] once `scrape` has returned.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use ideaprobe_core::types::{AggregatedResult, CompetitorRecord, FeedbackRecord, RunMetadata};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Job status surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Processing,
    PartialSuccess,
    Completed,
    Failed,
}

/// Map run metadata to the job status the caller sees: `Completed` when
/// nothing failed, `PartialSuccess` on mixed outcomes, `Failed` when no
/// source produced anything.
#[must_use]
pub fn job_status(metadata: &RunMetadata) -> JobStatus {
    if metadata.sources_successful == 0 && metadata.sources_partial == 0 {
        JobStatus::Failed
    } else if metadata.sources_failed > 0 || metadata.sources_partial > 0 {
        JobStatus::PartialSuccess
    } else {
        JobStatus::Completed
    }
}

/// Persistence backend for validation runs.
#[async_trait]
pub trait Store: Send + Sync {
    async fn update_status(
        &self,
        job_id: &str,
        status: JobStatus,
        extra: Option<serde_json::Value>,
    ) -> Result<(), StoreError>;

    async fn insert_competitors(
        &self,
        job_id: &str,
        competitors: &[CompetitorRecord],
    ) -> Result<(), StoreError>;

    async fn insert_feedback(
        &self,
        job_id: &str,
        feedback: &[FeedbackRecord],
    ) -> Result<(), StoreError>;

    async fn insert_metadata(
        &self,
        job_id: &str,
        metadata: serde_json::Value,
    ) -> Result<(), StoreError>;
}

/// Write one aggregated result through the store: records, metadata, then
/// the final status derived from the per-source buckets.
///
/// # Errors
///
/// Propagates the first [`StoreError`] the backend returns.
pub async fn persist(store: &dyn Store, result: &AggregatedResult) -> Result<(), StoreError> {
    let job_id = &result.metadata.job_id;
    store
        .update_status(job_id, JobStatus::Processing, None)
        .await?;
    store.insert_competitors(job_id, &result.competitors).await?;
    store.insert_feedback(job_id, &result.feedback).await?;
    store
        .insert_metadata(job_id, serde_json::to_value(&result.metadata)?)
        .await?;
    store
        .update_status(job_id, job_status(&result.metadata), None)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(successful: usize, partial: usize, failed: usize) -> RunMetadata {
        RunMetadata {
            job_id: "job".to_string(),
            processing_time_seconds: 0.1,
            sources_attempted: successful + partial + failed,
            sources_successful: successful,
            sources_partial: partial,
            sources_failed: failed,
            successful_sources: Vec::new(),
            partial_sources: Vec::new(),
            failed_sources: Vec::new(),
            total_competitors_found: 0,
            total_feedback_found: 0,
            completed_at: "2024-01-01T00:00:00Z".to_string(),
            error: None,
        }
    }

    #[test]
    fn all_successful_is_completed() {
        assert_eq!(job_status(&metadata(3, 0, 0)), JobStatus::Completed);
    }

    #[test]
    fn mixed_success_and_failure_is_partial() {
        assert_eq!(job_status(&metadata(2, 0, 1)), JobStatus::PartialSuccess);
        assert_eq!(job_status(&metadata(1, 1, 0)), JobStatus::PartialSuccess);
    }

    #[test]
    fn nothing_succeeded_is_failed() {
        assert_eq!(job_status(&metadata(0, 0, 3)), JobStatus::Failed);
        assert_eq!(job_status(&metadata(0, 0, 0)), JobStatus::Failed);
    }

    #[test]
    fn partial_only_is_partial() {
        assert_eq!(job_status(&metadata(0, 2, 0)), JobStatus::PartialSuccess);
    }
}
