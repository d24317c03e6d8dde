//! Remote dataset download.

use std::time::Duration;

use nursemap_core::{parse_dataset, AppConfig, Dataset};
use reqwest::Client;

use crate::error::MapsError;
use crate::retry::retry_with_backoff;

/// Downloads and parses the facility dataset from `url`.
///
/// Uses the configured timeout, user agent and retry policy. Malformed
/// records are skipped by the parser, not treated as an error.
///
/// # Errors
///
/// - [`MapsError::Http`] on network failure or non-2xx HTTP status after
///   retries are exhausted.
/// - [`MapsError::Dataset`] if the body is not a JSON array.
pub async fn fetch_dataset(url: &str, config: &AppConfig) -> Result<Dataset, MapsError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(&config.user_agent)
        .build()?;

    let client = &client;
    let body = retry_with_backoff(config.max_retries, config.retry_backoff_base_ms, || async move {
        let response = client.get(url).send().await?.error_for_status()?;
        Ok::<String, MapsError>(response.text().await?)
    })
    .await?;

    let dataset = parse_dataset(&body)?;
    tracing::info!(
        url,
        facilities = dataset.len(),
        skipped = dataset.skipped(),
        "dataset downloaded"
    );
    Ok(dataset)
}
