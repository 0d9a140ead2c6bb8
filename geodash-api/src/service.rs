//! Aggregation operations
//!
//! Each operation is one async pipeline: resolve the entity against the
//! geography index, fetch from the provider, then scope and reconcile the
//! payload. INSEE and ONISEP failures become [`ApiError::Upstream`]; France
//! Travail failures become a [`StatusEnvelope`] so the dashboard can degrade
//! per widget.

use geodash_common::{EntityRef, EntityType, GeoIndex};
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{ApiError, ApiResult};
use crate::provider::{
    DataProvider, EducationDataset, Establishment, FetchOutcome, GeoFacet, LaborMarketRequest,
    MelodiDataset, MelodiQuery, MelodiResponse,
};
use crate::reconcile::{
    self, statistics::NestedSeries, statistics::PopulationSeries, EmploymentYear,
    EstablishmentSummary, PerspectiveSummary, YearlyJobSeekers,
};
use crate::scope;

const FRANCE_TRAVAIL_UNAVAILABLE: &str = "L'API France Travail n'a pas répondu";
const JOB_SEEKERS_NOT_AVAILABLE: &str = "Les données ne sont pas disponibles au niveau communal";
const PERSPECTIVES_NOT_AVAILABLE: &str =
    "Les données de perspectives employeur ne sont pas disponibles au niveau communal ou EPCI";

/// Education levels served by the establishment endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EducationLevel {
    All,
    Sec,
    Sup,
}

impl EducationLevel {
    pub fn datasets(&self) -> &'static [EducationDataset] {
        match self {
            EducationLevel::All => &[EducationDataset::Sec, EducationDataset::Sup],
            EducationLevel::Sec => &[EducationDataset::Sec],
            EducationLevel::Sup => &[EducationDataset::Sup],
        }
    }
}

impl FromStr for EducationLevel {
    type Err = ApiError;

    fn from_str(s: &str) -> ApiResult<Self> {
        match s {
            "all" => Ok(EducationLevel::All),
            "sec" => Ok(EducationLevel::Sec),
            "sup" => Ok(EducationLevel::Sup),
            other => Err(ApiError::BadRequest(format!(
                "Invalid level '{}'. Must be one of: all, sec, sup",
                other
            ))),
        }
    }
}

/// Status of a degraded labor-market response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LaborStatus {
    NotAvailable,
    Error,
    Timeout,
    ServiceUnavailable,
}

/// `{status, message, data: null}` body of a degraded labor-market response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusEnvelope {
    pub status: LaborStatus,
    pub message: String,
    pub data: Option<()>,
}

impl StatusEnvelope {
    fn new(status: LaborStatus, message: &str) -> Self {
        Self {
            status,
            message: message.to_string(),
            data: None,
        }
    }

    fn from_failure<T>(failure: &FetchOutcome<T>) -> Self {
        let status = match failure {
            FetchOutcome::Timeout => LaborStatus::Timeout,
            FetchOutcome::ServiceUnavailable => LaborStatus::ServiceUnavailable,
            _ => LaborStatus::Error,
        };
        Self::new(status, FRANCE_TRAVAIL_UNAVAILABLE)
    }
}

/// Labor-market data, or the reason it is missing
#[derive(Debug, Clone, PartialEq)]
pub enum LaborOutcome<T> {
    Data(T),
    Degraded(StatusEnvelope),
}

/// Aggregation entry point shared by the HTTP handlers
#[derive(Clone)]
pub struct DashboardService {
    geo: Arc<GeoIndex>,
    provider: Arc<dyn DataProvider>,
}

impl DashboardService {
    pub fn new(geo: Arc<GeoIndex>, provider: Arc<dyn DataProvider>) -> Self {
        Self { geo, provider }
    }

    pub fn geo(&self) -> &GeoIndex {
        &self.geo
    }

    /// Validate raw parameters and check the entity exists
    ///
    /// # Errors
    /// 400 for malformed input, 404 for a well-formed code the index does not know.
    pub fn resolve(&self, code: &str, kind: &str) -> ApiResult<EntityRef> {
        let entity = EntityRef::parse(code, kind)?;
        if !self.geo.entity_exists(&entity) {
            return Err(ApiError::NotFound(format!(
                "Unknown {} code '{}'",
                entity.kind(),
                entity.code()
            )));
        }
        Ok(entity)
    }

    // ------------------------------------------------------------------
    // INSEE Melodi
    // ------------------------------------------------------------------

    pub async fn population(&self, entity: &EntityRef) -> ApiResult<PopulationSeries> {
        let response = self.melodi(MelodiDataset::Population, entity).await?;
        Ok(reconcile::population_by_year(&response))
    }

    pub async fn pcs(&self, entity: &EntityRef) -> ApiResult<NestedSeries> {
        let response = self.melodi(MelodiDataset::Pcs, entity).await?;
        Ok(reconcile::pcs_by_year(&response))
    }

    pub async fn diplomas(&self, entity: &EntityRef) -> ApiResult<NestedSeries> {
        let response = self.melodi(MelodiDataset::Diplomas, entity).await?;
        Ok(reconcile::diplomas_by_year(&response))
    }

    pub async fn employment(&self, entity: &EntityRef) -> ApiResult<BTreeMap<String, EmploymentYear>> {
        let response = self.melodi(MelodiDataset::Employment, entity).await?;
        Ok(reconcile::employment_by_year(&response))
    }

    async fn melodi(&self, dataset: MelodiDataset, entity: &EntityRef) -> ApiResult<MelodiResponse> {
        let query = MelodiQuery::new(dataset, entity);
        match self.provider.melodi(&query).await.into_result::<()>() {
            Ok(response) => {
                debug!(
                    dataset = dataset.id(),
                    entity = %entity,
                    observations = response.observations.len(),
                    "Melodi response received"
                );
                Ok(response)
            }
            Err(failure) => Err(ApiError::Upstream(format!(
                "Failed to query {} data for {}: {}",
                dataset.id(),
                entity,
                failure_detail(&failure)
            ))),
        }
    }

    // ------------------------------------------------------------------
    // ONISEP
    // ------------------------------------------------------------------

    /// Establishments of the entity, merged across the requested datasets
    ///
    /// Fails only when every requested dataset failed.
    pub async fn education(
        &self,
        entity: &EntityRef,
        level: EducationLevel,
    ) -> ApiResult<EstablishmentSummary> {
        let facet = self.facet_for(entity)?;
        debug!(entity = %entity, facet = %facet, ?level, "Querying establishments");

        let outcomes = match level {
            EducationLevel::All => {
                let (sec, sup) = tokio::join!(
                    self.provider.establishments(EducationDataset::Sec, &facet),
                    self.provider.establishments(EducationDataset::Sup, &facet),
                );
                vec![(EducationDataset::Sec, sec), (EducationDataset::Sup, sup)]
            }
            EducationLevel::Sec => vec![(
                EducationDataset::Sec,
                self.provider.establishments(EducationDataset::Sec, &facet).await,
            )],
            EducationLevel::Sup => vec![(
                EducationDataset::Sup,
                self.provider.establishments(EducationDataset::Sup, &facet).await,
            )],
        };

        let mut records: Vec<Establishment> = Vec::new();
        let mut failures = Vec::new();
        for (dataset, outcome) in outcomes {
            match outcome.into_result::<()>() {
                Ok(batch) => records.extend(batch),
                Err(failure) => {
                    warn!(
                        dataset = dataset.as_str(),
                        entity = %entity,
                        kind = ?failure.failure_kind(),
                        "Establishment dataset unavailable"
                    );
                    failures.push(format!("{}: {}", dataset.as_str(), failure_detail(&failure)));
                }
            }
        }
        if failures.len() == level.datasets().len() {
            return Err(ApiError::Upstream(format!(
                "Failed to query enseignement data for {} ({})",
                entity,
                failures.join(", ")
            )));
        }

        let scoped = scope::filter_by_entity(records, entity, &self.geo);
        let (unique, _) = scope::deduplicate(scoped, |e| e.uai.as_deref());
        let summary = reconcile::summarize_establishments(&unique);
        info!(entity = %entity, total = summary.total_etablissements, "Establishments summarized");
        Ok(summary)
    }

    fn facet_for(&self, entity: &EntityRef) -> ApiResult<GeoFacet> {
        let code = entity.code();
        let missing = || ApiError::NotFound(format!("No geographic facet for {}", entity));

        match entity.kind() {
            EntityType::Commune => {
                let (dep_code, dep_name) = self.geo.departement_of_commune(code).ok_or_else(missing)?;
                Ok(GeoFacet::Departement {
                    code: dep_code.to_string(),
                    name: dep_name.to_string(),
                })
            }
            EntityType::Epci => {
                let (_, region_name) = self.geo.region_of_epci(code).ok_or_else(missing)?;
                Ok(GeoFacet::Region {
                    name: region_name.to_string(),
                })
            }
            EntityType::Departement => {
                let name = self.geo.departement_name(code).found().ok_or_else(missing)?;
                Ok(GeoFacet::Departement {
                    code: code.to_string(),
                    name: name.to_string(),
                })
            }
            EntityType::Region => {
                let name = self.geo.region_name(code).found().ok_or_else(missing)?;
                Ok(GeoFacet::Region {
                    name: name.to_string(),
                })
            }
        }
    }

    // ------------------------------------------------------------------
    // France Travail
    // ------------------------------------------------------------------

    /// Yearly job-seeker averages; not available at commune level
    pub async fn job_seekers(
        &self,
        entity: &EntityRef,
    ) -> LaborOutcome<BTreeMap<String, YearlyJobSeekers>> {
        if entity.kind() == EntityType::Commune {
            return LaborOutcome::Degraded(StatusEnvelope::new(
                LaborStatus::NotAvailable,
                JOB_SEEKERS_NOT_AVAILABLE,
            ));
        }

        let request = LaborMarketRequest::job_seekers(entity);
        match self.provider.job_seekers(&request).await.into_result::<()>() {
            Ok(response) => {
                debug!(entity = %entity, periods = response.periods.len(), "Job-seeker periods received");
                LaborOutcome::Data(reconcile::summarize_job_seekers(&response))
            }
            Err(failure) => LaborOutcome::Degraded(StatusEnvelope::from_failure(&failure)),
        }
    }

    /// Employer perspectives; not available at commune or EPCI level
    ///
    /// `Data(None)` means the upstream had no entries for the territory.
    pub async fn perspectives(
        &self,
        entity: &EntityRef,
    ) -> LaborOutcome<Option<PerspectiveSummary>> {
        if matches!(entity.kind(), EntityType::Commune | EntityType::Epci) {
            return LaborOutcome::Degraded(StatusEnvelope::new(
                LaborStatus::NotAvailable,
                PERSPECTIVES_NOT_AVAILABLE,
            ));
        }

        let request = LaborMarketRequest::employer_perspectives(entity);
        match self.provider.employer_perspectives(&request).await.into_result::<()>() {
            Ok(response) => {
                debug!(entity = %entity, entries = response.entries.len(), "Perspective entries received");
                LaborOutcome::Data(reconcile::summarize_perspectives(&response))
            }
            Err(failure) => LaborOutcome::Degraded(StatusEnvelope::from_failure(&failure)),
        }
    }
}

fn failure_detail<T>(failure: &FetchOutcome<T>) -> String {
    match failure {
        FetchOutcome::Error(detail) | FetchOutcome::Fatal(detail) => detail.clone(),
        other => other.failure_kind().unwrap_or("unknown").to_string(),
    }
}
