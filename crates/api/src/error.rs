//! API Error Responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use data_validator::ValidationError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Errors returned to the caller of the inference endpoint
#[derive(Debug, Error)]
pub enum ApiError {
    /// The body decoded but failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The body could not be decoded as JSON
    #[error("Malformed request: {0}")]
    Malformed(String),

    /// Unknown route
    #[error("Not found")]
    NotFound,

    /// Anything else; details are logged, not returned
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Validation(ValidationError::MissingFields(fields)) => {
                warn!("{}", self);
                (
                    StatusCode::BAD_REQUEST,
                    json!({ "error": self.to_string(), "missing_fields": fields }),
                )
            }
            ApiError::Validation(_) | ApiError::Malformed(_) => {
                warn!("{}", self);
                (StatusCode::BAD_REQUEST, json!({ "error": self.to_string() }))
            }
            ApiError::NotFound => (StatusCode::NOT_FOUND, json!({ "error": self.to_string() })),
            ApiError::Internal(msg) => {
                error!("Server error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
