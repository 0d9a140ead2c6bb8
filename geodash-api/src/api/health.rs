//! Welcome and health check endpoints

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

/// Health check response with the loaded geography counts
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub communes: usize,
    pub epcis: usize,
    pub departements: usize,
    pub regions: usize,
}

/// GET /
pub async fn welcome() -> &'static str {
    "Welcome to the geodash dashboard backend!"
}

/// GET /dashboard/health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.geo.stats();
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "geodash-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.startup_time.elapsed().as_secs(),
        communes: stats.communes,
        epcis: stats.epcis,
        departements: stats.departements,
        regions: stats.regions,
    })
}
