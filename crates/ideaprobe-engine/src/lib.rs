//! Orchestration for ideaprobe validation runs.
//!
//! [`ScrapingService`] fans out to every registered source scraper under a
//! bounded-concurrency semaphore and a global deadline, aggregates their
//! results with per-source provenance, and runs the post-processing chain
//! (clean, dedup, enrich, sentiment, summarize). [`store`] defines the
//! persistence contract the surrounding system implements.

pub mod service;
pub mod store;

pub use service::ScrapingService;
pub use store::{job_status, persist, JobStatus, Store, StoreError};
