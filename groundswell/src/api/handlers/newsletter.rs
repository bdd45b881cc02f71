//! Intake handler: validates the access token, then hands the request to the
//! configured synthesis strategy.

use axum::extract::State;
use axum::Json;

use crate::api::dto::{AssistantRequest, AssistantResponse, RunHandle};
use crate::api::AppState;
use crate::error::Result;
use crate::llm::RunStatus;
use crate::synthesis::SynthesisStart;

/// `POST /api/assistant`
///
/// Tool-calling strategy: returns `{threadId, runId, status}` for the client
/// to poll. Grounding strategy: returns `{status: "completed", response}`
/// directly.
pub async fn create_newsletter(
    State(state): State<AppState>,
    Json(request): Json<AssistantRequest>,
) -> Result<Json<AssistantResponse>> {
    state.authorize(&request.api_key)?;

    let request = request.resolve();
    tracing::info!(
        regions = ?request.regions,
        query_count = request.queries.len(),
        "Newsletter request accepted"
    );

    let response = match state.synthesizer.begin(&request).await? {
        SynthesisStart::Pending {
            thread_id,
            run_id,
            status,
        } => AssistantResponse::Started(RunHandle {
            thread_id,
            run_id,
            status,
        }),
        SynthesisStart::Completed { response } => AssistantResponse::Completed {
            status: RunStatus::Completed,
            response,
        },
    };

    Ok(Json(response))
}
