//! Upstream data providers
//!
//! The aggregation layer talks to upstream services only through the
//! [`DataProvider`] trait. Every call resolves to a [`FetchOutcome`]: the
//! payload, or exactly one failure class. Nothing here retries; the caller
//! turns failures into response envelopes.

mod http;
pub mod schema;
mod token;

pub use http::HttpDataProvider;
pub use schema::{
    EducationDataset, Establishment, JobSeekerResponse, MelodiResponse, PerspectiveResponse,
};
pub use token::TokenCache;

use async_trait::async_trait;
use geodash_common::{EntityRef, EntityType};
use serde::Serialize;
use std::fmt;

/// Result of one upstream call
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    Ok(T),
    /// No answer within the configured timeout
    Timeout,
    /// Gateway errors (HTTP 502, 503, 504)
    ServiceUnavailable,
    /// Transport or HTTP error, including missing credentials
    Error(String),
    /// Upstream answered with something that does not match its schema
    Fatal(String),
}

impl<T> FetchOutcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FetchOutcome<U> {
        match self {
            FetchOutcome::Ok(value) => FetchOutcome::Ok(f(value)),
            FetchOutcome::Timeout => FetchOutcome::Timeout,
            FetchOutcome::ServiceUnavailable => FetchOutcome::ServiceUnavailable,
            FetchOutcome::Error(detail) => FetchOutcome::Error(detail),
            FetchOutcome::Fatal(detail) => FetchOutcome::Fatal(detail),
        }
    }

    pub fn ok(self) -> Option<T> {
        match self {
            FetchOutcome::Ok(value) => Some(value),
            _ => None,
        }
    }

    /// Split into the payload or the same failure re-typed for another payload
    pub fn into_result<U>(self) -> Result<T, FetchOutcome<U>> {
        match self {
            FetchOutcome::Ok(value) => Ok(value),
            FetchOutcome::Timeout => Err(FetchOutcome::Timeout),
            FetchOutcome::ServiceUnavailable => Err(FetchOutcome::ServiceUnavailable),
            FetchOutcome::Error(detail) => Err(FetchOutcome::Error(detail)),
            FetchOutcome::Fatal(detail) => Err(FetchOutcome::Fatal(detail)),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, FetchOutcome::Ok(_))
    }

    /// Failure label used in logs and error messages
    pub fn failure_kind(&self) -> Option<&'static str> {
        match self {
            FetchOutcome::Ok(_) => None,
            FetchOutcome::Timeout => Some("timeout"),
            FetchOutcome::ServiceUnavailable => Some("service_unavailable"),
            FetchOutcome::Error(_) => Some("error"),
            FetchOutcome::Fatal(_) => Some("fatal"),
        }
    }
}

// ============================================================================
// Request descriptors
// ============================================================================

/// INSEE Melodi datasets used by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MelodiDataset {
    Population,
    Pcs,
    Diplomas,
    Employment,
}

impl MelodiDataset {
    pub fn id(&self) -> &'static str {
        match self {
            MelodiDataset::Population => "DS_RP_POPULATION_PRINC",
            MelodiDataset::Pcs => "DS_RP_POPULATION_COMP",
            MelodiDataset::Diplomas => "DS_RP_DIPLOMES_PRINC",
            MelodiDataset::Employment => "DS_RP_EMPLOI_LR_PRINC",
        }
    }

    /// Fixed dimension filters sent with every query of this dataset
    pub fn static_filters(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            MelodiDataset::Population => &[
                ("SEX", "_T"),
                ("AGE", "Y_LT15"),
                ("AGE", "Y15T24"),
                ("AGE", "Y25T39"),
                ("AGE", "_T"),
            ],
            MelodiDataset::Pcs => &[("SEX", "_T"), ("AGE", "Y_GE15")],
            MelodiDataset::Diplomas => &[("SEX", "_T"), ("AGE", "Y_GE15")],
            MelodiDataset::Employment => &[("SEX", "_T"), ("AGE", "Y15T64")],
        }
    }
}

/// One Melodi dataset query scoped to a territory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MelodiQuery {
    pub dataset: MelodiDataset,
    /// `COM-75056`, `EPCI-200054781`, `DEP-75` or `REG-11`
    pub geo: String,
}

impl MelodiQuery {
    pub fn new(dataset: MelodiDataset, entity: &EntityRef) -> Self {
        Self {
            dataset,
            geo: format!("{}-{}", territory_type(entity.kind()), entity.code()),
        }
    }

    /// Query-string pairs: static filters then the territory
    pub fn params(&self) -> Vec<(&str, &str)> {
        let mut params: Vec<(&str, &str)> = self.dataset.static_filters().to_vec();
        params.push(("GEO", self.geo.as_str()));
        params
    }
}

/// Body of a France Travail statistics request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaborMarketRequest {
    pub code_type_territoire: String,
    pub code_territoire: String,
    pub code_type_activite: String,
    pub code_activite: String,
    pub code_type_periode: String,
    pub code_type_nomenclature: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liste_code_nomenclature: Option<Vec<String>>,
}

impl LaborMarketRequest {
    /// Quarterly category-A job seekers, all activities
    pub fn job_seekers(entity: &EntityRef) -> Self {
        Self {
            liste_code_nomenclature: Some(vec!["A".to_string()]),
            ..Self::base(entity, "TRIMESTRE", "CATCAND")
        }
    }

    /// Yearly recruitment-tension indicators, all activities
    pub fn employer_perspectives(entity: &EntityRef) -> Self {
        Self::base(entity, "ANNEE", "TYPE_TENSION")
    }

    fn base(entity: &EntityRef, period_type: &str, nomenclature: &str) -> Self {
        Self {
            code_type_territoire: territory_type(entity.kind()).to_string(),
            code_territoire: entity.code().to_string(),
            code_type_activite: "CUMUL".to_string(),
            code_activite: "CUMUL".to_string(),
            code_type_periode: period_type.to_string(),
            code_type_nomenclature: nomenclature.to_string(),
            liste_code_nomenclature: None,
        }
    }
}

/// Territory type code shared by INSEE (`GEO` prefix) and France Travail
pub fn territory_type(kind: EntityType) -> &'static str {
    match kind {
        EntityType::Commune => "COM",
        EntityType::Epci => "EPCI",
        EntityType::Departement => "DEP",
        EntityType::Region => "REG",
    }
}

/// ONISEP geographic facet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeoFacet {
    Departement { code: String, name: String },
    Region { name: String },
}

impl GeoFacet {
    /// `(parameter, value)`; the higher-education dataset prefixes
    /// département names with their code
    pub fn param(&self, dataset: EducationDataset) -> (&'static str, String) {
        match (self, dataset) {
            (GeoFacet::Departement { code, name }, EducationDataset::Sup) => {
                ("facet.departement", format!("{} - {}", code, name))
            }
            (GeoFacet::Departement { name, .. }, EducationDataset::Sec) => {
                ("facet.departement", name.clone())
            }
            (GeoFacet::Region { name }, _) => ("facet.region", name.clone()),
        }
    }
}

impl fmt::Display for GeoFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeoFacet::Departement { code, name } => write!(f, "departement {} ({})", name, code),
            GeoFacet::Region { name } => write!(f, "region {}", name),
        }
    }
}

/// Access to every upstream the dashboard aggregates
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// INSEE Melodi observations
    async fn melodi(&self, query: &MelodiQuery) -> FetchOutcome<MelodiResponse>;

    /// France Travail quarterly job-seeker statistics
    async fn job_seekers(&self, request: &LaborMarketRequest) -> FetchOutcome<JobSeekerResponse>;

    /// France Travail yearly employer perspectives
    async fn employer_perspectives(
        &self,
        request: &LaborMarketRequest,
    ) -> FetchOutcome<PerspectiveResponse>;

    /// ONISEP establishments matching a facet, tagged with their dataset
    async fn establishments(
        &self,
        dataset: EducationDataset,
        facet: &GeoFacet,
    ) -> FetchOutcome<Vec<Establishment>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(code: &str, kind: &str) -> EntityRef {
        EntityRef::parse(code, kind).unwrap()
    }

    #[test]
    fn test_melodi_geo_codes() {
        let query = MelodiQuery::new(MelodiDataset::Population, &entity("75056", "commune"));
        assert_eq!(query.geo, "COM-75056");
        assert_eq!(
            MelodiQuery::new(MelodiDataset::Pcs, &entity("2A", "departement")).geo,
            "DEP-2A"
        );
        let params = query.params();
        assert_eq!(params.first(), Some(&("SEX", "_T")));
        assert_eq!(params.last(), Some(&("GEO", "COM-75056")));
        assert_eq!(params.len(), 6);
    }

    #[test]
    fn test_labor_market_request_body() {
        let body = serde_json::to_value(LaborMarketRequest::job_seekers(&entity("200054781", "epci"))).unwrap();
        assert_eq!(body["codeTypeTerritoire"], "EPCI");
        assert_eq!(body["codeTerritoire"], "200054781");
        assert_eq!(body["codeTypePeriode"], "TRIMESTRE");
        assert_eq!(body["listeCodeNomenclature"][0], "A");

        let body = serde_json::to_value(LaborMarketRequest::employer_perspectives(&entity("84", "region"))).unwrap();
        assert_eq!(body["codeTypeTerritoire"], "REG");
        assert_eq!(body["codeTypeNomenclature"], "TYPE_TENSION");
        assert!(body.get("listeCodeNomenclature").is_none());
    }

    #[test]
    fn test_facet_formats() {
        let facet = GeoFacet::Departement {
            code: "13".to_string(),
            name: "Bouches-du-Rhône".to_string(),
        };
        assert_eq!(
            facet.param(EducationDataset::Sup),
            ("facet.departement", "13 - Bouches-du-Rhône".to_string())
        );
        assert_eq!(
            facet.param(EducationDataset::Sec),
            ("facet.departement", "Bouches-du-Rhône".to_string())
        );
        let facet = GeoFacet::Region { name: "Bretagne".to_string() };
        assert_eq!(facet.param(EducationDataset::Sup), ("facet.region", "Bretagne".to_string()));
    }

    #[test]
    fn test_outcome_map() {
        let outcome: FetchOutcome<i32> = FetchOutcome::Ok(2);
        assert_eq!(outcome.map(|v| v * 2), FetchOutcome::Ok(4));
        let outcome: FetchOutcome<i32> = FetchOutcome::Timeout;
        assert_eq!(outcome.failure_kind(), Some("timeout"));
        assert_eq!(outcome.map(|v| v * 2), FetchOutcome::Timeout);
    }
}
