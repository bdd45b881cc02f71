use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GroundswellError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Search error: {0}")]
    Search(String),

    #[error("LLM error: {0}")]
    Llm(String),
}

impl IntoResponse for GroundswellError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            GroundswellError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            GroundswellError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            GroundswellError::Http(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            GroundswellError::Json(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            GroundswellError::Search(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            GroundswellError::Llm(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
        };

        let body = Json(json!({
            "error": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, GroundswellError>;
