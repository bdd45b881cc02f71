use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::config::SearchConfig;
use crate::error::{GroundswellError, Result};

const DEFAULT_BASE_URL: &str = "https://api.tavily.com";

/// Thin client for the hosted web-search API.
///
/// One attempt per query, no retry: batch-level callers degrade individual
/// failures to placeholders instead.
#[derive(Clone, Debug)]
pub struct SearchClient {
    client: Client,
    api_key: String,
    base_url: String,
    max_results: u32,
    time_range: String,
}

#[derive(Debug, Serialize)]
struct SearchRequestBody<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: u32,
    time_range: &'a str,
}

impl SearchClient {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GroundswellError::Search(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone().unwrap_or_default(),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            max_results: config.max_results,
            time_range: config.time_range.clone(),
        })
    }

    pub fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Issues one search call and returns the provider JSON unmodified.
    pub async fn search(&self, query: &str) -> Result<Value> {
        let body = SearchRequestBody {
            api_key: &self.api_key,
            query,
            max_results: self.max_results,
            time_range: &self.time_range,
        };

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(GroundswellError::Search(format!(
                "Search request failed with status {status}: {detail}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| GroundswellError::Search(format!("Failed to parse search response: {e}")))
    }
}
