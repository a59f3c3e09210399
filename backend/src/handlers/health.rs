//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
    pub inventory_loaded: bool,
    /// Minutes since the in-memory snapshot was captured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory_age_minutes: Option<i64>,
}

/// Health check endpoint handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    // Check database connectivity
    let db_status = match state.data_source.ping().await {
        Ok(_) => "connected".to_string(),
        Err(_) => "disconnected".to_string(),
    };

    let age = state.cache.staleness().await;

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
        inventory_loaded: age.is_some(),
        inventory_age_minutes: age.map(|d| d.num_minutes().max(0)),
    })
}
