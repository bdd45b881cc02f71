use std::sync::Arc;

use crate::config::{Config, SynthesisStrategy};
use crate::error::{GroundswellError, Result};
use crate::llm::{AssistantsClient, GroundedClient};
use crate::search::{SearchClient, SearchDispatcher};
use crate::synthesis::{GroundingSynthesizer, Synthesizer, ToolCallingSynthesizer};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub search: SearchDispatcher,
    pub synthesizer: Arc<dyn Synthesizer>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let config = Arc::new(config);

        let search = SearchDispatcher::new(SearchClient::new(&config.search)?);

        let synthesizer: Arc<dyn Synthesizer> = match config.llm.strategy {
            SynthesisStrategy::ToolCalling => Arc::new(ToolCallingSynthesizer::new(
                AssistantsClient::new(&config.llm)?,
                search.clone(),
            )),
            SynthesisStrategy::Grounding => {
                Arc::new(GroundingSynthesizer::new(GroundedClient::new(&config.llm)?))
            }
        };

        Ok(Self {
            config,
            search,
            synthesizer,
        })
    }

    /// Checks the intake access token against the configured list. No
    /// provider call is made when this fails.
    pub fn authorize(&self, token: &str) -> Result<()> {
        if self.config.server.access_tokens.is_empty() {
            return Err(GroundswellError::Unauthorized(
                "Access tokens not configured. Set GROUNDSWELL_ACCESS_TOKENS to enable access."
                    .to_string(),
            ));
        }

        if self
            .config
            .server
            .access_tokens
            .iter()
            .any(|configured| configured == token)
        {
            Ok(())
        } else {
            Err(GroundswellError::Unauthorized(
                "Invalid access token".to_string(),
            ))
        }
    }
}
