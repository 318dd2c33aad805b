use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::monitor::{LastRun, RunReport};
use crate::store::{OfflineRecord, OfflineStore};

/// Application state shared across handlers
pub struct AppState {
    pub store: Arc<dyn OfflineStore>,
    pub urls: Vec<String>,
    pub last_run: LastRun,
}

// ============================================================================
// Health Check
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================================
// Offline records
// ============================================================================

#[derive(Serialize)]
pub struct OfflineResponse {
    pub records: Vec<OfflineRecord>,
}

pub async fn list_offline(
    State(state): State<Arc<AppState>>,
) -> Result<Json<OfflineResponse>, ApiError> {
    let records = state
        .store
        .list()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(OfflineResponse { records }))
}

// ============================================================================
// Status
// ============================================================================

#[derive(Serialize)]
pub struct StatusResponse {
    pub urls: Vec<String>,
    pub last_run: Option<RunReport>,
}

pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        urls: state.urls.clone(),
        last_run: state.last_run.read().clone(),
    })
}

// ============================================================================
// Errors
// ============================================================================

pub enum ApiError {
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}
