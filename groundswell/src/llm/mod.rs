pub mod assistants;
pub mod grounded;
pub mod prompts;

pub use assistants::{AssistantsClient, RunStatus};
pub use grounded::{GroundedClient, GroundingMetadata};
