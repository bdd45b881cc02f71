//! Wire DTOs for the newsletter API. Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

use crate::llm::prompts::{default_queries, DEFAULT_REGION};
use crate::llm::RunStatus;
use crate::synthesis::NewsletterRequest;

/// Body of `POST /api/assistant`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantRequest {
    pub message: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub regions: Option<Vec<String>>,
    #[serde(default)]
    pub queries: Option<Vec<String>>,
    pub api_key: String,
}

impl AssistantRequest {
    /// Applies the default region and seed queries when the request omits
    /// them. Accepts either a single `region` or a `regions` list.
    pub fn resolve(self) -> NewsletterRequest {
        let regions = self
            .regions
            .filter(|regions| !regions.is_empty())
            .or_else(|| self.region.map(|region| vec![region]))
            .unwrap_or_else(|| vec![DEFAULT_REGION.to_string()]);

        let queries = self
            .queries
            .filter(|queries| !queries.is_empty())
            .unwrap_or_else(default_queries);

        NewsletterRequest {
            message: self.message,
            regions,
            queries,
        }
    }
}

/// Body of `POST /api/assistant/status`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRequest {
    pub thread_id: String,
    pub run_id: String,
}

/// Body of `POST /api/assistant/status/serverless`: either a status check or
/// an initial-search request distinguished by its `type` field.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ServerlessRequest {
    InitialSearch(InitialSearchRequest),
    Status(StatusRequest),
}

#[derive(Debug, Deserialize)]
pub struct InitialSearchRequest {
    #[serde(rename = "type")]
    pub kind: InitialSearchKind,
    #[serde(default)]
    pub queries: Option<Vec<String>>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub regions: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub enum InitialSearchKind {
    #[serde(rename = "initial_search")]
    InitialSearch,
}

impl InitialSearchRequest {
    pub fn regions(&self) -> Vec<String> {
        self.regions
            .clone()
            .filter(|regions| !regions.is_empty())
            .or_else(|| self.region.clone().map(|region| vec![region]))
            .unwrap_or_else(|| vec![DEFAULT_REGION.to_string()])
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries
            .clone()
            .filter(|queries| !queries.is_empty())
            .unwrap_or_else(default_queries)
    }
}

/// Successful intake response: either a pending run handle or, for the
/// grounding strategy, the finished newsletter.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AssistantResponse {
    Started(RunHandle),
    Completed { status: RunStatus, response: String },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunHandle {
    pub thread_id: String,
    pub run_id: String,
    pub status: RunStatus,
}

/// Status-check response.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum StatusResponse {
    Pending { status: RunStatus },
    Completed { status: RunStatus, response: String },
    Failed { status: RunStatus, error: String },
}

impl StatusResponse {
    pub fn completed(response: String) -> Self {
        Self::Completed {
            status: RunStatus::Completed,
            response,
        }
    }

    pub fn failed(error: String) -> Self {
        Self::Failed {
            status: RunStatus::Failed,
            error,
        }
    }
}
