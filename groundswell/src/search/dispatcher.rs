use futures::future::join_all;
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::Result;
use crate::search::SearchClient;

/// Aggregated search output for one region: one entry per query, in query
/// order, failures included as placeholders.
#[derive(Debug, Clone, Serialize)]
pub struct RegionSearchResults {
    pub region: String,
    pub results: Vec<Value>,
}

/// Marker emitted in place of a failed search call so sibling calls in the
/// same batch keep their positions.
pub fn empty_results_placeholder() -> Value {
    json!({ "error": "Search failed", "results": [] })
}

/// Fans queries out across regions and gathers results per region.
#[derive(Clone, Debug)]
pub struct SearchDispatcher {
    client: SearchClient,
}

impl SearchDispatcher {
    pub fn new(client: SearchClient) -> Self {
        Self { client }
    }

    pub fn is_available(&self) -> bool {
        self.client.is_available()
    }

    /// Raw single-query passthrough. Errors propagate to the caller.
    pub async fn search(&self, query: &str) -> Result<Value> {
        self.client.search(query).await
    }

    /// Single query with batch semantics: a failed call degrades to an
    /// explicit empty-result marker instead of an error.
    pub async fn search_or_placeholder(&self, query: &str) -> Value {
        match self.client.search(query).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(query, error = %e, "Search call failed, substituting empty results");
                empty_results_placeholder()
            }
        }
    }

    /// Runs every `query` × `region` combination concurrently and aggregates
    /// the results per region. Each query is qualified with the region name
    /// and a Wikipedia exclusion before dispatch.
    pub async fn search_regions(
        &self,
        queries: &[String],
        regions: &[String],
    ) -> Vec<RegionSearchResults> {
        let batches = regions.iter().map(|region| async move {
            let region_queries: Vec<String> = queries
                .iter()
                .map(|query| format!("{region} {query} -site:wikipedia.org"))
                .collect();

            tracing::debug!(region, query_count = region_queries.len(), "Dispatching region search batch");

            let results = join_all(
                region_queries
                    .iter()
                    .map(|query| self.search_or_placeholder(query)),
            )
            .await;

            RegionSearchResults {
                region: region.clone(),
                results,
            }
        });

        join_all(batches).await
    }
}
