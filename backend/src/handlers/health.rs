//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;
use shared::SourceInfo;

use crate::error::AppResult;
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded: Option<SourceInfo>,
}

/// Health check endpoint handler
pub async fn health_check(State(state): State<AppState>) -> AppResult<Json<HealthResponse>> {
    // Report the cache state only; health checks never read the source
    let loaded = state.dashboard.cached_info();
    let source_status = if loaded.is_some() { "loaded" } else { "not_loaded" };

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        source: source_status.to_string(),
        loaded,
    }))
}
