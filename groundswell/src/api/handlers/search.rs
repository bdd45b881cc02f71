use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::api::AppState;
use crate::error::{GroundswellError, Result};

#[derive(Debug, Deserialize)]
pub struct PassthroughParams {
    #[serde(default)]
    pub search: Option<String>,
}

/// `GET /api/tavily?search=<q>`
///
/// Ad hoc single-query passthrough returning the raw provider JSON.
pub async fn passthrough(
    State(state): State<AppState>,
    Query(params): Query<PassthroughParams>,
) -> Result<Json<Value>> {
    let query = params
        .search
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| {
            GroundswellError::Validation("Search parameter is required".to_string())
        })?;

    let results = state.search.search(&query).await?;
    Ok(Json(results))
}
