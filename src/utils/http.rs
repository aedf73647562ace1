// src/utils/http.rs

//! HTTP client utilities.
//!
//! Adapters run one after another on the calling thread, so the blocking
//! client is used throughout. A request that exceeds the configured timeout
//! surfaces as an error and fails the adapter that issued it.

use std::time::Duration;

use reqwest::blocking::Client;
use scraper::Html;

use crate::error::Result;
use crate::models::ScraperConfig;

/// Create a configured blocking HTTP client.
pub fn create_client(config: &ScraperConfig) -> Result<Client> {
    let client = Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Fetch a page body as text. Non-success statuses are errors.
pub fn fetch_text(client: &Client, url: &str) -> Result<String> {
    let response = client.get(url).send()?.error_for_status()?;
    Ok(response.text()?)
}

/// Fetch a page and parse it as HTML.
pub fn fetch_page(client: &Client, url: &str) -> Result<Html> {
    let text = fetch_text(client, url)?;
    Ok(Html::parse_document(&text))
}

/// Fetch raw bytes (images and other assets).
pub fn fetch_bytes(client: &Client, url: &str) -> Result<Vec<u8>> {
    let response = client.get(url).send()?.error_for_status()?;
    Ok(response.bytes()?.to_vec())
}
