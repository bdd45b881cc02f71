//! Status handlers for pending runs, including the serverless variant that
//! doubles as the initial-search endpoint.

use axum::extract::State;
use axum::Json;
use serde_json::Value;

use crate::api::dto::{ServerlessRequest, StatusRequest, StatusResponse};
use crate::api::AppState;
use crate::error::Result;
use crate::synthesis::PollOutcome;

/// `POST /api/assistant/status`
///
/// One status check. On `requires_action` the pending tool calls are
/// executed and their outputs submitted as a single batch before returning;
/// the client keeps polling until a terminal status comes back.
pub async fn check_status(
    State(state): State<AppState>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<StatusResponse>> {
    let outcome = state
        .synthesizer
        .check(&request.thread_id, &request.run_id)
        .await?;

    Ok(Json(poll_outcome_response(outcome)))
}

/// `POST /api/assistant/status/serverless`
///
/// Same contract as `check_status`, plus an `{type: "initial_search"}` mode
/// that returns the raw aggregated search JSON per region.
pub async fn serverless(
    State(state): State<AppState>,
    Json(request): Json<ServerlessRequest>,
) -> Result<Json<Value>> {
    match request {
        ServerlessRequest::InitialSearch(search_request) => {
            let results = state
                .search
                .search_regions(&search_request.queries(), &search_request.regions())
                .await;
            Ok(Json(serde_json::to_value(results)?))
        }
        ServerlessRequest::Status(status_request) => {
            let outcome = state
                .synthesizer
                .check(&status_request.thread_id, &status_request.run_id)
                .await?;
            Ok(Json(serde_json::to_value(poll_outcome_response(outcome))?))
        }
    }
}

fn poll_outcome_response(outcome: PollOutcome) -> StatusResponse {
    match outcome {
        PollOutcome::Pending(status) => StatusResponse::Pending { status },
        PollOutcome::Completed { response } => StatusResponse::completed(response),
        PollOutcome::Failed { message } => StatusResponse::failed(message),
    }
}
