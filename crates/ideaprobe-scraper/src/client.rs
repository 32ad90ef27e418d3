//! Shared HTTP client construction for source scrapers.

use std::time::Duration;

use reqwest::Client;

use crate::error::ScraperError;

/// Connect timeout applied to every scraper client.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Builds a `reqwest::Client` with the configured request timeout and
/// `User-Agent`.
///
/// # Errors
///
/// Returns [`ScraperError::Http`] if the underlying client cannot be
/// constructed (e.g. invalid TLS config).
pub fn build_http_client(timeout_secs: u64, user_agent: &str) -> Result<Client, ScraperError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}
