//! INSEE census series endpoints
//!
//! All four endpoints take `entity_code` and `entity_type` (default
//! `commune`) and answer `{"status": "success", "data": {year: ...}}`.

use axum::{
    extract::State,
    Json,
};
use geodash_common::EntityType;
use std::collections::BTreeMap;
use tracing::info;

use super::{ApiQuery, EntityQuery, Success};
use crate::error::ApiResult;
use crate::reconcile::statistics::{NestedSeries, PopulationSeries};
use crate::reconcile::EmploymentYear;
use crate::AppState;

/// GET /dashboard/population
pub async fn get_population(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EntityQuery>,
) -> ApiResult<Json<Success<PopulationSeries>>> {
    let entity = query.resolve(&state.service, EntityType::Commune)?;
    info!(entity = %entity, "Population request");
    Ok(Json(Success::new(state.service.population(&entity).await?)))
}

/// GET /dashboard/pcs
pub async fn get_pcs(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EntityQuery>,
) -> ApiResult<Json<Success<NestedSeries>>> {
    let entity = query.resolve(&state.service, EntityType::Commune)?;
    info!(entity = %entity, "PCS request");
    Ok(Json(Success::new(state.service.pcs(&entity).await?)))
}

/// GET /dashboard/diplomes
pub async fn get_diplomas(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EntityQuery>,
) -> ApiResult<Json<Success<NestedSeries>>> {
    let entity = query.resolve(&state.service, EntityType::Commune)?;
    info!(entity = %entity, "Diploma request");
    Ok(Json(Success::new(state.service.diplomas(&entity).await?)))
}

/// GET /dashboard/emploi
pub async fn get_employment(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EntityQuery>,
) -> ApiResult<Json<Success<BTreeMap<String, EmploymentYear>>>> {
    let entity = query.resolve(&state.service, EntityType::Commune)?;
    info!(entity = %entity, "Employment request");
    Ok(Json(Success::new(state.service.employment(&entity).await?)))
}
