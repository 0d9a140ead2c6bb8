//! France Travail labor-market endpoints
//!
//! Degraded answers (unsupported level, upstream failure, missing
//! credentials) are HTTP 200 with a `{status, message, data: null}` envelope.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use geodash_common::EntityType;
use serde::{ser::SerializeMap, Serialize, Serializer};
use tracing::{info, warn};

use super::{ApiQuery, EntityQuery, Success};
use crate::error::ApiResult;
use crate::service::LaborOutcome;
use crate::AppState;

/// Serializes `None` as an empty object
#[derive(Debug)]
pub struct OrEmpty<T>(pub Option<T>);

impl<T: Serialize> Serialize for OrEmpty<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.0 {
            Some(value) => value.serialize(serializer),
            None => serializer.serialize_map(Some(0))?.end(),
        }
    }
}

fn respond<T: Serialize>(outcome: LaborOutcome<T>, entity: &dyn std::fmt::Display) -> Response {
    match outcome {
        LaborOutcome::Data(data) => Json(Success::new(data)).into_response(),
        LaborOutcome::Degraded(envelope) => {
            warn!(entity = %entity, status = ?envelope.status, "Labor-market data degraded");
            Json(envelope).into_response()
        }
    }
}

/// GET /dashboard/demandeurs-emploi (entity_type defaults to `epci`)
pub async fn get_job_seekers(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EntityQuery>,
) -> ApiResult<Response> {
    let entity = query.resolve(&state.service, EntityType::Epci)?;
    info!(entity = %entity, "Job-seeker request");
    let outcome = state.service.job_seekers(&entity).await;
    Ok(respond(outcome, &entity))
}

/// GET /dashboard/perspectives-employeur (entity_type defaults to `departement`)
pub async fn get_perspectives(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EntityQuery>,
) -> ApiResult<Response> {
    let entity = query.resolve(&state.service, EntityType::Departement)?;
    info!(entity = %entity, "Employer perspectives request");
    let outcome = match state.service.perspectives(&entity).await {
        LaborOutcome::Data(summary) => LaborOutcome::Data(OrEmpty(summary)),
        LaborOutcome::Degraded(envelope) => LaborOutcome::Degraded(envelope),
    };
    Ok(respond(outcome, &entity))
}
