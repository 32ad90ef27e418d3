//! Source scrapers for ideaprobe.
//!
//! Defines the [`SourceScraper`] contract the orchestrator drives, shared
//! query-generation and rate-limit helpers, and the iOS App Store reference
//! implementation backed by the public iTunes JSON APIs.

pub mod app_store;
pub mod client;
pub mod contract;
pub mod error;
pub mod queries;
pub mod rate_limit;

pub use app_store::AppStoreScraper;
pub use client::build_http_client;
pub use contract::SourceScraper;
pub use error::ScraperError;
pub use queries::generate_search_queries;
pub use rate_limit::query_pause;
