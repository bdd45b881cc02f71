use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::llm::assistants::{AssistantsClient, RunStatus, ToolCall, ToolOutput};
use crate::llm::prompts::{
    build_research_message, search_tool_definition, NEWSLETTER_INSTRUCTIONS, SEARCH_TOOL_NAME,
};
use crate::search::{empty_results_placeholder, SearchDispatcher};
use crate::synthesis::{NewsletterRequest, PollOutcome, SynthesisStart, Synthesizer};

const ASSISTANT_NAME: &str = "Research Assistant";

/// Assistant-run strategy: pre-fetches region searches, starts a run, and
/// answers the model's mid-run search requests during status checks.
///
/// The assistant id is a per-request value returned by the creation call; it
/// is never cached across requests.
#[derive(Clone)]
pub struct ToolCallingSynthesizer {
    assistants: AssistantsClient,
    search: SearchDispatcher,
}

impl ToolCallingSynthesizer {
    pub fn new(assistants: AssistantsClient, search: SearchDispatcher) -> Self {
        Self { assistants, search }
    }

    /// Executes every pending tool call and produces one output per call.
    /// A failed or unrecognized call yields a placeholder output so the
    /// batch stays complete: the provider only accepts full submissions.
    async fn execute_tool_calls(&self, tool_calls: Vec<ToolCall>) -> Vec<ToolOutput> {
        let mut outputs = Vec::with_capacity(tool_calls.len());

        for tool_call in tool_calls {
            let output = if tool_call.function.name == SEARCH_TOOL_NAME {
                match parse_query_argument(&tool_call.function.arguments) {
                    Some(query) => {
                        tracing::info!(query = %query, "Executing requested search");
                        self.search.search_or_placeholder(&query).await
                    }
                    None => {
                        tracing::warn!(
                            arguments = %tool_call.function.arguments,
                            "Tool call arguments had no query"
                        );
                        empty_results_placeholder()
                    }
                }
            } else {
                tracing::warn!(name = %tool_call.function.name, "Unknown tool requested");
                empty_results_placeholder()
            };

            outputs.push(ToolOutput {
                tool_call_id: tool_call.id,
                output: output.to_string(),
            });
        }

        outputs
    }
}

fn parse_query_argument(arguments: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(arguments).ok()?;
    parsed
        .get("query")
        .and_then(|q| q.as_str())
        .filter(|q| !q.trim().is_empty())
        .map(str::to_string)
}

#[async_trait]
impl Synthesizer for ToolCallingSynthesizer {
    async fn begin(&self, request: &NewsletterRequest) -> Result<SynthesisStart> {
        let search_results = self
            .search
            .search_regions(&request.queries, &request.regions)
            .await;

        let assistant = self
            .assistants
            .create_assistant(
                ASSISTANT_NAME,
                NEWSLETTER_INSTRUCTIONS,
                &[search_tool_definition()],
            )
            .await?;

        let thread = self.assistants.create_thread().await?;

        let content = build_research_message(&search_results, &request.message)?;
        self.assistants
            .add_user_message(&thread.id, &content)
            .await?;

        let run = self.assistants.create_run(&thread.id, &assistant.id).await?;

        tracing::info!(
            thread_id = %thread.id,
            run_id = %run.id,
            status = %run.status,
            "Started newsletter run"
        );

        Ok(SynthesisStart::Pending {
            thread_id: thread.id,
            run_id: run.id,
            status: run.status,
        })
    }

    async fn check(&self, thread_id: &str, run_id: &str) -> Result<PollOutcome> {
        let run = self.assistants.retrieve_run(thread_id, run_id).await?;

        match run.status {
            RunStatus::RequiresAction => {
                if let Some(action) = run.required_action {
                    let outputs = self
                        .execute_tool_calls(action.submit_tool_outputs.tool_calls)
                        .await;
                    if !outputs.is_empty() {
                        self.assistants
                            .submit_tool_outputs(thread_id, run_id, &outputs)
                            .await?;
                    }
                }
                Ok(PollOutcome::Pending(RunStatus::RequiresAction))
            }
            RunStatus::Completed => {
                let response = self.assistants.latest_message_text(thread_id).await?;
                Ok(PollOutcome::Completed { response })
            }
            status if status.is_terminal() => {
                // The remote thread/run is left as-is; nothing retries it.
                tracing::warn!(thread_id, run_id, status = %status, "Run ended without completing");
                Ok(PollOutcome::Failed {
                    message: run
                        .last_error
                        .map(|e| e.message)
                        .unwrap_or_else(|| format!("Run ended with status {status}")),
                })
            }
            status => Ok(PollOutcome::Pending(status)),
        }
    }
}
