//! Prediction Route

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use dispatcher::ClassificationResult;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::error::ApiError;
use crate::AppState;

/// Response body for a classified reading
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    /// Class index (0 = Happy, 1 = Needs Water, 2 = Unhealthy)
    pub prediction: u8,
    /// Class probabilities, model path only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probabilities: Option<Vec<f64>>,
    pub message: &'static str,
    /// Why the rule engine answered, fallback path only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
}

impl From<&ClassificationResult> for PredictResponse {
    fn from(result: &ClassificationResult) -> Self {
        Self {
            prediction: result.label.index(),
            probabilities: result.probabilities.map(|p| p.to_vec()),
            message: result.label.message(),
            note: result.note(),
        }
    }
}

/// Classify one sensor reading
pub async fn predict(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(body) = body.map_err(|rejection| {
        state.stats.record_rejected();
        ApiError::Malformed(rejection.body_text())
    })?;
    debug!("Received data: {}", body);

    let reading = state.validator.validate(&body).map_err(|e| {
        state.stats.record_rejected();
        ApiError::from(e)
    })?;

    let result = state.dispatcher.classify(&reading);
    state.stats.record(&result);

    Ok(Json(PredictResponse::from(&result)))
}
