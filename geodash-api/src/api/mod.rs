//! HTTP API handlers for geodash-api

pub mod education;
pub mod health;
pub mod labor;
pub mod search;
pub mod statistics;

pub use education::get_education;
pub use health::{health_check, welcome};
pub use labor::{get_job_seekers, get_perspectives};
pub use search::search;
pub use statistics::{get_diplomas, get_employment, get_pcs, get_population};

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
    routing::get,
    Router,
};
use geodash_common::{EntityRef, EntityType};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::service::DashboardService;
use crate::AppState;

/// `{"status": "success", "data": ...}`
#[derive(Debug, Serialize)]
pub struct Success<T> {
    pub status: &'static str,
    pub data: T,
}

impl<T> Success<T> {
    pub fn new(data: T) -> Self {
        Self {
            status: "success",
            data,
        }
    }
}

/// `Query` extractor whose rejection is an [`ApiError::BadRequest`]
///
/// Malformed query strings (duplicated keys, bad encoding) get the same JSON
/// error body as every other validation failure.
#[derive(Debug)]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Territory selection shared by every dashboard endpoint
#[derive(Debug, Default, Deserialize)]
pub struct EntityQuery {
    pub entity_code: Option<String>,
    pub entity_type: Option<String>,
}

impl EntityQuery {
    /// Validate against the index; `entity_type` falls back to `default`
    pub fn resolve(&self, service: &DashboardService, default: EntityType) -> ApiResult<EntityRef> {
        let code = self
            .entity_code
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ApiError::BadRequest("Missing entity_code parameter".to_string()))?;
        let kind = self.entity_type.as_deref().unwrap_or(default.as_str());
        service.resolve(code, kind)
    }
}

/// Routes under `/dashboard`
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard/health", get(health_check))
        .route("/dashboard/search", get(search))
        .route("/dashboard/population", get(get_population))
        .route("/dashboard/pcs", get(get_pcs))
        .route("/dashboard/diplomes", get(get_diplomas))
        .route("/dashboard/emploi", get(get_employment))
        .route("/dashboard/enseignement", get(get_education))
        .route("/dashboard/demandeurs-emploi", get(get_job_seekers))
        .route("/dashboard/perspectives-employeur", get(get_perspectives))
}
