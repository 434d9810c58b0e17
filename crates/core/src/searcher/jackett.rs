//! Jackett indexer implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::JackettConfig;

use super::{generate_ids, sort_by_seeds, Indexer, SearchError, SearchResult};

/// Jackett indexer, querying all configured Jackett indexers at once.
pub struct JackettIndexer {
    client: Client,
    config: JackettConfig,
}

impl JackettIndexer {
    /// Create a new JackettIndexer with the given configuration.
    pub fn new(config: JackettConfig) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| SearchError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Build the Jackett API URL for a search.
    fn build_search_url(&self, query: &str) -> String {
        format!(
            "{}/api/v2.0/indexers/all/results?apikey={}&Query={}",
            self.config.url.trim_end_matches('/'),
            urlencoding::encode(&self.config.api_key),
            urlencoding::encode(query)
        )
    }
}

#[async_trait]
impl Indexer for JackettIndexer {
    fn name(&self) -> &str {
        "jackett"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        info!(query = %query, "Jackett: searching");

        let url = self.build_search_url(query);
        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                SearchError::Timeout
            } else if e.is_connect() {
                SearchError::ConnectionFailed(e.to_string())
            } else {
                SearchError::ApiError(e.to_string())
            }
        })?;

        let status = response.status();
        info!(query = %query, status = status.as_u16(), "Jackett: response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::ApiError(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let jackett_response: JackettResponse = response
            .json()
            .await
            .map_err(|e| SearchError::ApiError(format!("Failed to parse response: {}", e)))?;

        let results = parse_results(jackett_response);
        debug!(query = %query, results = results.len(), "Jackett search complete");
        Ok(results)
    }
}

/// Convert a Jackett response into sorted results with fresh ids.
fn parse_results(response: JackettResponse) -> Vec<SearchResult> {
    let ids = generate_ids(response.Results.len());

    let mut results: Vec<SearchResult> = response
        .Results
        .into_iter()
        .zip(ids)
        .map(|(r, id)| {
            SearchResult::from_indexer(
                id,
                r.Title.unwrap_or_default(),
                r.Size.and_then(|s| u64::try_from(s).ok()),
                r.Seeders.and_then(|s| u32::try_from(s).ok()),
                r.MagnetUri,
                r.Link,
                r.Tracker,
            )
        })
        .collect();

    sort_by_seeds(&mut results);
    results
}

// Jackett API response types
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct JackettResponse {
    #[serde(default)]
    Results: Vec<JackettResult>,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct JackettResult {
    Title: Option<String>,
    Size: Option<i64>,
    Seeders: Option<i64>,
    MagnetUri: Option<String>,
    Link: Option<String>,
    Tracker: Option<String>,
}
