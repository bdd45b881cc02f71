//! Newsletter synthesis strategies.
//!
//! Two mutually exclusive ways to obtain the newsletter text from a hosted
//! model, behind one trait selected by configuration: an assistant run that
//! pauses for tool calls, or a single grounded call where the model searches
//! internally.

pub mod citations;
mod grounding;
mod tool_calling;

pub use grounding::GroundingSynthesizer;
pub use tool_calling::ToolCallingSynthesizer;

use async_trait::async_trait;

use crate::error::Result;
use crate::llm::RunStatus;

/// A resolved intake request: regions and queries defaulted, token already
/// checked.
#[derive(Debug, Clone)]
pub struct NewsletterRequest {
    pub message: String,
    pub regions: Vec<String>,
    pub queries: Vec<String>,
}

/// Outcome of starting synthesis.
#[derive(Debug, Clone)]
pub enum SynthesisStart {
    /// A run is underway; the client polls the status endpoint with these
    /// provider-assigned identifiers.
    Pending {
        thread_id: String,
        run_id: String,
        status: RunStatus,
    },
    /// The strategy finished in one call.
    Completed { response: String },
}

/// Outcome of one status check on a pending run.
#[derive(Debug, Clone)]
pub enum PollOutcome {
    /// Still working; the returned status is the last observed provider
    /// state.
    Pending(RunStatus),
    Completed { response: String },
    /// The run reached a terminal failure state. Not retried.
    Failed { message: String },
}

#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Kicks off synthesis for one request.
    async fn begin(&self, request: &NewsletterRequest) -> Result<SynthesisStart>;

    /// Checks a pending run, executing and submitting any tool calls the
    /// provider is blocked on.
    async fn check(&self, thread_id: &str, run_id: &str) -> Result<PollOutcome>;
}
