//! geodash-api library - territorial dashboard backend
//!
//! Resolves French territories against the in-memory geography index and
//! aggregates INSEE, France Travail and ONISEP data for them.

use axum::{http::HeaderValue, http::Method, routing::get, Router};
use geodash_common::GeoIndex;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

pub mod api;
pub mod error;
pub mod provider;
pub mod reconcile;
pub mod scope;
pub mod service;

pub use error::{ApiError, ApiResult};
pub use service::DashboardService;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Geography index (read-only after startup)
    pub geo: Arc<GeoIndex>,
    pub service: DashboardService,
    /// Server startup time, reported by the health endpoint
    pub startup_time: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(geo: Arc<GeoIndex>, provider: Arc<dyn provider::DataProvider>) -> Self {
        Self {
            service: DashboardService::new(geo.clone(), provider),
            geo,
            startup_time: Instant::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(api::welcome))
        .merge(api::dashboard_routes())
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for GET requests from the configured origins; unparsable origins are skipped
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET])
}
