//! ONISEP establishment endpoint

use axum::{
    extract::State,
    Json,
};
use geodash_common::EntityType;
use serde::Deserialize;
use tracing::info;

use super::{ApiQuery, EntityQuery, Success};
use crate::error::ApiResult;
use crate::reconcile::EstablishmentSummary;
use crate::service::EducationLevel;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct EducationQuery {
    #[serde(flatten)]
    pub entity: EntityQuery,
    /// `all`, `sec` or `sup`
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "all".to_string()
}

/// GET /dashboard/enseignement
pub async fn get_education(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EducationQuery>,
) -> ApiResult<Json<Success<EstablishmentSummary>>> {
    let entity = query.entity.resolve(&state.service, EntityType::Commune)?;
    let level: EducationLevel = query.level.parse()?;
    info!(entity = %entity, level = %query.level, "Education request");
    Ok(Json(Success::new(state.service.education(&entity, level).await?)))
}
