use async_trait::async_trait;

use crate::error::{GroundswellError, Result};
use crate::llm::grounded::GroundedClient;
use crate::llm::prompts::{build_grounded_prompt, NEWSLETTER_INSTRUCTIONS};
use crate::synthesis::citations::stitch_citations;
use crate::synthesis::{NewsletterRequest, PollOutcome, SynthesisStart, Synthesizer};

/// Grounded strategy: one blocking call to a model that searches internally,
/// then citation stitching. No run to poll.
#[derive(Clone)]
pub struct GroundingSynthesizer {
    client: GroundedClient,
}

impl GroundingSynthesizer {
    pub fn new(client: GroundedClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Synthesizer for GroundingSynthesizer {
    async fn begin(&self, request: &NewsletterRequest) -> Result<SynthesisStart> {
        let prompt = build_grounded_prompt(&request.regions, &request.message);
        let answer = self.client.generate(NEWSLETTER_INSTRUCTIONS, &prompt).await?;

        let response = stitch_citations(&answer.text, answer.metadata.as_ref());

        Ok(SynthesisStart::Completed { response })
    }

    async fn check(&self, _thread_id: &str, _run_id: &str) -> Result<PollOutcome> {
        Err(GroundswellError::Validation(
            "The grounding strategy completes in a single call; there is no run to poll"
                .to_string(),
        ))
    }
}
