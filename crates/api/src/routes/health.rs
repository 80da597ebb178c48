//! Health and Metrics Routes

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::ApiError;
use crate::telemetry::RequestCounts;
use crate::AppState;

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub model: ModelStatus,
    pub requests: RequestCounts,
}

/// Classifier status
#[derive(Debug, Serialize)]
pub struct ModelStatus {
    pub loaded: bool,
    pub name: Option<String>,
    /// "model" or "fallback_only"
    pub mode: &'static str,
}

/// Health check handler
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let loaded = state.dispatcher.has_model();

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        model: ModelStatus {
            loaded,
            name: state.dispatcher.model_name().map(str::to_string),
            mode: if loaded { "model" } else { "fallback_only" },
        },
        requests: state.stats.snapshot(),
    })
}

/// Prometheus exposition, 404 when metrics are disabled
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()).into_response(),
        None => ApiError::NotFound.into_response(),
    }
}
