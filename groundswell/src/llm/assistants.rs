//! Client for the hosted assistant API: threads, runs, and tool-call
//! round-trips. Identifiers are provider-assigned and live only for the
//! duration of one request/poll cycle; nothing is cached across requests.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::LlmConfig;
use crate::error::{GroundswellError, Result};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const BETA_HEADER: &str = "OpenAI-Beta";
const BETA_VERSION: &str = "assistants=v2";

/// Provider-defined run lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Expired,
    Incomplete,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::RequiresAction => "requires_action",
            Self::Cancelling => "cancelling",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
            Self::Completed => "completed",
            Self::Expired => "expired",
            Self::Incomplete => "incomplete",
        }
    }

    /// True for states the run can never leave.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Cancelled | Self::Failed | Self::Completed | Self::Expired | Self::Incomplete
        )
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
pub struct Assistant {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct Thread {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct Run {
    pub id: String,
    pub status: RunStatus,
    #[serde(default)]
    pub required_action: Option<RequiredAction>,
    #[serde(default)]
    pub last_error: Option<RunError>,
}

#[derive(Debug, Deserialize)]
pub struct RunError {
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct RequiredAction {
    #[serde(rename = "type")]
    pub kind: String,
    pub submit_tool_outputs: SubmitToolOutputsAction,
}

#[derive(Debug, Deserialize)]
pub struct SubmitToolOutputsAction {
    pub tool_calls: Vec<ToolCall>,
}

/// A pending tool invocation the provider is blocked on.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded argument object, passed through as the provider sent it.
    pub arguments: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolOutput {
    pub tool_call_id: String,
    pub output: String,
}

#[derive(Debug, Deserialize)]
struct MessageList {
    data: Vec<ThreadMessage>,
}

#[derive(Debug, Deserialize)]
struct ThreadMessage {
    content: Vec<MessageContent>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum MessageContent {
    Text { text: TextContent },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Deserialize)]
struct TextContent {
    value: String,
}

#[derive(Clone, Debug)]
pub struct AssistantsClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl AssistantsClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GroundswellError::Llm(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone().unwrap_or_default(),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: config.model.clone(),
        })
    }

    /// Creates a fresh assistant for this request. The returned id is never
    /// cached: every intake call gets its own assistant.
    pub async fn create_assistant(
        &self,
        name: &str,
        instructions: &str,
        tools: &[Value],
    ) -> Result<Assistant> {
        let body = json!({
            "model": self.model,
            "name": name,
            "instructions": instructions,
            "tools": tools,
        });
        self.post_json("assistants", &body).await
    }

    pub async fn create_thread(&self) -> Result<Thread> {
        self.post_json("threads", &json!({})).await
    }

    pub async fn add_user_message(&self, thread_id: &str, content: &str) -> Result<()> {
        let body = json!({ "role": "user", "content": content });
        let _: Value = self
            .post_json(&format!("threads/{thread_id}/messages"), &body)
            .await?;
        Ok(())
    }

    pub async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run> {
        let body = json!({ "assistant_id": assistant_id });
        self.post_json(&format!("threads/{thread_id}/runs"), &body)
            .await
    }

    pub async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        self.get_json(&format!("threads/{thread_id}/runs/{run_id}"))
            .await
    }

    /// Submits the outputs for every pending tool call as one batch. The
    /// provider does not accept partial submissions.
    pub async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<Run> {
        let body = json!({ "tool_outputs": outputs });
        self.post_json(
            &format!("threads/{thread_id}/runs/{run_id}/submit_tool_outputs"),
            &body,
        )
        .await
    }

    /// Returns the text of the most recent message on the thread.
    pub async fn latest_message_text(&self, thread_id: &str) -> Result<String> {
        let list: MessageList = self
            .get_json(&format!("threads/{thread_id}/messages?limit=1&order=desc"))
            .await?;

        let text = list
            .data
            .into_iter()
            .next()
            .and_then(|message| {
                message.content.into_iter().find_map(|part| match part {
                    MessageContent::Text { text } => Some(text.value),
                    MessageContent::Unsupported => None,
                })
            })
            .ok_or_else(|| {
                GroundswellError::Llm("Completed run produced no text message".to_string())
            })?;

        Ok(text)
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<T> {
        let response = self
            .client
            .post(format!("{}/{path}", self.base_url))
            .bearer_auth(&self.api_key)
            .header(BETA_HEADER, BETA_VERSION)
            .json(body)
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .client
            .get(format!("{}/{path}", self.base_url))
            .bearer_auth(&self.api_key)
            .header(BETA_HEADER, BETA_VERSION)
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(GroundswellError::Llm(format!(
                "Assistant API request failed with status {status}: {detail}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| GroundswellError::Llm(format!("Failed to parse assistant response: {e}")))
    }
}
