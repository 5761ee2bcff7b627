//! Error types for the server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::error::HeartwiseError;

#[derive(Error, Debug)]
pub enum ServerError {
    /// Missing, malformed or non-numeric input; detail stays in the logs
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<HeartwiseError> for ServerError {
    fn from(err: HeartwiseError) -> Self {
        if err.is_validation() {
            ServerError::InvalidInput(err.to_string())
        } else {
            ServerError::Internal(err.to_string())
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::InvalidInput(detail) => {
                tracing::info!(detail = %detail, "Rejected prediction input");
                (StatusCode::BAD_REQUEST, "Invalid input")
            }
            ServerError::Internal(detail) => {
                tracing::error!(detail = %detail, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "An internal error occurred")
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
