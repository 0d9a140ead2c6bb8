//! Integration tests for geodash-api endpoints
//!
//! The router runs against a small geography fixture and a stub provider
//! returning canned upstream payloads, so no network access is needed.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use geodash_api::provider::{
    DataProvider, EducationDataset, Establishment, FetchOutcome, GeoFacet, JobSeekerResponse,
    LaborMarketRequest, MelodiQuery, MelodiResponse, PerspectiveResponse,
};
use geodash_api::{build_router, AppState};
use geodash_common::GeoIndex;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt; // for `oneshot` method

const GEO_FIXTURE: &str = "\
75056;Paris;200054781;Métropole du Grand Paris;75;11
13055;Marseille;200054807;Métropole d'Aix-Marseille-Provence;13;93
13001;Aix-en-Provence;200054807;Métropole d'Aix-Marseille-Provence;13;93
83137;Toulon;248300543;Métropole Toulon-Provence-Méditerranée;83;93
";

/// Provider returning canned payloads and recording what was asked
#[derive(Default)]
struct StubProvider {
    melodi: HashMap<&'static str, FetchOutcome<Value>>,
    job_seekers: Option<FetchOutcome<Value>>,
    perspectives: Option<FetchOutcome<Value>>,
    establishments: HashMap<EducationDataset, FetchOutcome<Value>>,
    calls: Mutex<Vec<String>>,
    facets: Mutex<Vec<(EducationDataset, GeoFacet)>>,
}

impl StubProvider {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

fn decode<T: DeserializeOwned>(outcome: Option<&FetchOutcome<Value>>) -> FetchOutcome<T> {
    outcome
        .cloned()
        .unwrap_or_else(|| FetchOutcome::Error("no fixture".to_string()))
        .map(|value| serde_json::from_value(value).expect("fixture should match schema"))
}

#[async_trait]
impl DataProvider for StubProvider {
    async fn melodi(&self, query: &MelodiQuery) -> FetchOutcome<MelodiResponse> {
        self.record(format!("melodi {} {}", query.dataset.id(), query.geo));
        decode(self.melodi.get(query.dataset.id()))
    }

    async fn job_seekers(&self, request: &LaborMarketRequest) -> FetchOutcome<JobSeekerResponse> {
        self.record(format!("job_seekers {} {}", request.code_type_territoire, request.code_territoire));
        decode(self.job_seekers.as_ref())
    }

    async fn employer_perspectives(
        &self,
        request: &LaborMarketRequest,
    ) -> FetchOutcome<PerspectiveResponse> {
        self.record(format!("perspectives {} {}", request.code_type_territoire, request.code_territoire));
        decode(self.perspectives.as_ref())
    }

    async fn establishments(
        &self,
        dataset: EducationDataset,
        facet: &GeoFacet,
    ) -> FetchOutcome<Vec<Establishment>> {
        self.facets.lock().unwrap().push((dataset, facet.clone()));
        decode::<Vec<Establishment>>(self.establishments.get(&dataset)).map(|records| {
            records
                .into_iter()
                .map(|mut e| {
                    e.source = Some(dataset);
                    e
                })
                .collect()
        })
    }
}

/// Test helper: load the geography fixture through a real file
fn load_geo() -> GeoIndex {
    let mut file = tempfile::NamedTempFile::new().expect("Should create temp file");
    file.write_all(GEO_FIXTURE.as_bytes()).expect("Should write fixture");
    GeoIndex::load(file.path()).expect("Should load fixture")
}

fn setup_app(provider: Arc<StubProvider>) -> Router {
    let origins = vec!["http://localhost:5500".to_string()];
    build_router(AppState::new(Arc::new(load_geo()), provider), &origins)
}

/// Test helper: GET a URI and decode the JSON body
async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    let body = serde_json::from_slice(&bytes).expect("Should parse JSON");
    (status, body)
}

fn observation(period: &str, dims: Value, value: f64) -> Value {
    let mut dimensions = dims;
    dimensions["TIME_PERIOD"] = json!(period);
    json!({"dimensions": dimensions, "measures": {"OBS_VALUE_NIVEAU": {"value": value}}})
}

// =============================================================================
// Welcome, Health and CORS
// =============================================================================

#[tokio::test]
async fn test_welcome() {
    let app = setup_app(Arc::new(StubProvider::default()));
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("Welcome"));
}

#[tokio::test]
async fn test_health_reports_geography_counts() {
    let app = setup_app(Arc::new(StubProvider::default()));
    let (status, body) = get_json(app, "/dashboard/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "geodash-api");
    assert!(body["version"].is_string());
    assert_eq!(body["communes"], 4);
    assert_eq!(body["epcis"], 3);
    assert_eq!(body["departements"], 3);
    assert_eq!(body["regions"], 2);
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let app = setup_app(Arc::new(StubProvider::default()));
    let request = Request::builder()
        .uri("/dashboard/health")
        .header("Origin", "http://localhost:5500")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "http://localhost:5500"
    );
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn test_search_finds_all_levels() {
    let app = setup_app(Arc::new(StubProvider::default()));
    let (status, body) = get_json(app, "/dashboard/search?q=Paris").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["results"]["communes"][0]["code"], "75056");
    assert_eq!(body["results"]["communes"][0]["nom"], "Paris");
    let departements = body["results"]["departements"].as_array().unwrap();
    assert!(departements.iter().any(|d| d["code"] == "75"));
    assert_eq!(body["results"]["epcis"][0]["code"], "200054781");
}

#[tokio::test]
async fn test_search_accent_insensitive() {
    let app = setup_app(Arc::new(StubProvider::default()));
    let (_, body) = get_json(app, "/dashboard/search?q=mediterranee").await;
    assert_eq!(body["results"]["epcis"][0]["code"], "248300543");
}

#[tokio::test]
async fn test_search_missing_query() {
    for uri in ["/dashboard/search", "/dashboard/search?q=", "/dashboard/search?q=%20%20"] {
        let app = setup_app(Arc::new(StubProvider::default()));
        let (status, body) = get_json(app, uri).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "uri {}", uri);
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Missing query parameter");
        for level in ["communes", "epcis", "departements", "regions"] {
            assert_eq!(body["results"][level], json!([]));
        }
    }
}

#[tokio::test]
async fn test_search_undecodable_query_is_json_error() {
    let app = setup_app(Arc::new(StubProvider::default()));
    let (status, body) = get_json(app, "/dashboard/search?q=paris&q=lyon").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("duplicate field"));
    assert_eq!(body["results"]["communes"], json!([]));
}

// =============================================================================
// Parameter validation
// =============================================================================

#[tokio::test]
async fn test_missing_entity_code() {
    let app = setup_app(Arc::new(StubProvider::default()));
    let (status, body) = get_json(app, "/dashboard/population").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Missing entity_code parameter");
}

#[tokio::test]
async fn test_invalid_entity_type_and_code() {
    let provider = Arc::new(StubProvider::default());

    let (status, body) = get_json(
        setup_app(provider.clone()),
        "/dashboard/population?entity_code=75056&entity_type=canton",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("entity_type"));

    let (status, _) = get_json(
        setup_app(provider.clone()),
        "/dashboard/pcs?entity_code=75.056",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_json(
        setup_app(provider.clone()),
        "/dashboard/pcs?entity_code=12345678901",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_undecodable_query_is_json_error() {
    let provider = Arc::new(StubProvider::default());
    for uri in [
        "/dashboard/population?entity_code=75056&entity_code=13055",
        "/dashboard/demandeurs-emploi?entity_code=200054807&entity_type=epci&entity_type=commune",
    ] {
        let (status, body) = get_json(setup_app(provider.clone()), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri {}", uri);
        assert_eq!(body["status"], "error");
        assert!(body["message"].as_str().unwrap().contains("duplicate field"));
    }
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_unknown_entity_is_not_found() {
    let provider = Arc::new(StubProvider::default());
    let (status, body) = get_json(
        setup_app(provider.clone()),
        "/dashboard/emploi?entity_code=99999",
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
    assert!(provider.calls().is_empty());
}

// =============================================================================
// INSEE series
// =============================================================================

#[tokio::test]
async fn test_population_series() {
    let mut provider = StubProvider::default();
    provider.melodi.insert(
        "DS_RP_POPULATION_PRINC",
        FetchOutcome::Ok(json!({"observations": [
            observation("2021", json!({"AGE": "_T"}), 2_133_110.6),
            observation("2015", json!({"AGE": "_T"}), 2_206_488.0),
            observation("2021", json!({"AGE": "Y_LT15"}), 301_000.0),
        ]})),
    );
    let provider = Arc::new(provider);

    let (status, body) = get_json(
        setup_app(provider.clone()),
        "/dashboard/population?entity_code=75056",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["2021"]["_T"], 2_133_111);
    assert_eq!(body["data"]["2021"]["Y_LT15"], 301_000);
    assert_eq!(body["data"]["2015"]["_T"], 2_206_488);
    assert_eq!(provider.calls(), vec!["melodi DS_RP_POPULATION_PRINC COM-75056"]);
}

#[tokio::test]
async fn test_pcs_scoped_to_epci() {
    let mut provider = StubProvider::default();
    provider.melodi.insert(
        "DS_RP_POPULATION_COMP",
        FetchOutcome::Ok(json!({"observations": [
            observation("2022", json!({"AGE": "Y_GE15", "PCS": "8"}), 10.0),
            observation("2022", json!({"AGE": "Y_GE15", "PCS": "9"}), 5.0),
        ]})),
    );
    let provider = Arc::new(provider);

    let (status, body) = get_json(
        setup_app(provider.clone()),
        "/dashboard/pcs?entity_code=200054807&entity_type=epci",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["2022"]["Y_GE15"], json!({"8": 15}));
    assert_eq!(provider.calls(), vec!["melodi DS_RP_POPULATION_COMP EPCI-200054807"]);
}

#[tokio::test]
async fn test_diplomas_series() {
    let mut provider = StubProvider::default();
    provider.melodi.insert(
        "DS_RP_DIPLOMES_PRINC",
        FetchOutcome::Ok(json!({"observations": [
            observation("2021", json!({"AGE": "Y_GE15", "DIPL": "350T351_RP"}), 1200.4),
        ]})),
    );
    let (status, body) = get_json(
        setup_app(Arc::new(provider)),
        "/dashboard/diplomes?entity_code=13&entity_type=departement",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["2021"]["Y_GE15"]["350T351_RP"], 1200);
}

#[tokio::test]
async fn test_employment_rates() {
    let mut provider = StubProvider::default();
    provider.melodi.insert(
        "DS_RP_EMPLOI_LR_PRINC",
        FetchOutcome::Ok(json!({"observations": [
            observation("2021", json!({"EMPSTA_ENQ": "_T"}), 1000.0),
            observation("2021", json!({"EMPSTA_ENQ": "1"}), 600.0),
            observation("2021", json!({"EMPSTA_ENQ": "2"}), 40.0),
        ]})),
    );
    let (status, body) = get_json(
        setup_app(Arc::new(provider)),
        "/dashboard/emploi?entity_code=93&entity_type=region",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let year = &body["data"]["2021"];
    assert_eq!(year["population_15_64"], 1000);
    assert_eq!(year["nombre_actifs"], 640);
    assert_eq!(year["nombre_actifs_ayant_emploi"], 600);
    assert_eq!(year["nombre_chomeurs"], 40);
    assert_eq!(year["taux_emploi"], 60.0);
    assert_eq!(year["taux_chomage"], 6.3);
}

#[tokio::test]
async fn test_insee_failure_is_bad_gateway() {
    let mut provider = StubProvider::default();
    provider
        .melodi
        .insert("DS_RP_POPULATION_PRINC", FetchOutcome::ServiceUnavailable);
    let (status, body) = get_json(
        setup_app(Arc::new(provider)),
        "/dashboard/population?entity_code=75056",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("service_unavailable"));
}

// =============================================================================
// Education
// =============================================================================

fn establishments_fixture() -> StubProvider {
    let mut provider = StubProvider::default();
    provider.establishments.insert(
        EducationDataset::Sec,
        FetchOutcome::Ok(json!([
            {"code_uai": "0130001A", "nom": "Lycée Thiers", "statut": "Public",
             "type_detablissement": "Lycée", "commune_cog": "13055",
             "longitude_x": "5.38", "latitude_y": "43.30"},
            {"code_uai": "0130002B", "nom": "Collège d'Aix", "statut": "Privé",
             "type_detablissement": "Collège", "commune_cog": "13001"},
            {"code_uai": "0830001C", "nom": "Lycée de Toulon", "statut": "Public",
             "type_detablissement": "Lycée", "commune_cog": "83137"}
        ])),
    );
    provider.establishments.insert(
        EducationDataset::Sup,
        FetchOutcome::Ok(json!([
            {"uai": "0130001A", "nom": "Lycée Thiers (BTS)", "commune_cog": "13055"},
            {"uai": "0133333Z", "nom": "Aix-Marseille Université", "statut": "Public",
             "type_detablissement": "Université", "commune_cog": "13001",
             "longitude_x": 5.44, "latitude_y": 43.52}
        ])),
    );
    provider
}

#[tokio::test]
async fn test_education_epci_scope_and_dedup() {
    let provider = Arc::new(establishments_fixture());
    let (status, body) = get_json(
        setup_app(provider.clone()),
        "/dashboard/enseignement?entity_code=200054807&entity_type=epci",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    // Toulon is outside the EPCI; the duplicate UAI is dropped
    assert_eq!(data["total_etablissements"], 3);
    assert_eq!(data["status_counts"]["Public"], 2);
    assert_eq!(data["status_counts"]["Privé"], 1);
    assert_eq!(data["type_counts"]["Université"], 1);
    let coordinates = data["coordinates"].as_array().unwrap();
    assert_eq!(coordinates.len(), 2);
    assert_eq!(coordinates[0]["_source"], "sec");
    assert_eq!(coordinates[1]["_source"], "sup");
    assert_eq!(coordinates[1]["longitude"], 5.44);

    let facets = provider.facets.lock().unwrap().clone();
    assert_eq!(facets.len(), 2);
    assert!(facets.iter().all(|(_, facet)| *facet
        == GeoFacet::Region {
            name: "Provence-Alpes-Côte d'Azur".to_string()
        }));
}

#[tokio::test]
async fn test_education_commune_level_sec_only() {
    let provider = Arc::new(establishments_fixture());
    let (status, body) = get_json(
        setup_app(provider.clone()),
        "/dashboard/enseignement?entity_code=13001&level=sec",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_etablissements"], 1);
    assert_eq!(body["data"]["type_counts"]["Collège"], 1);
    assert_eq!(body["data"]["coordinates"], json!([]));

    let facets = provider.facets.lock().unwrap().clone();
    assert_eq!(
        facets,
        vec![(
            EducationDataset::Sec,
            GeoFacet::Departement {
                code: "13".to_string(),
                name: "Bouches-du-Rhône".to_string()
            }
        )]
    );
}

#[tokio::test]
async fn test_education_partial_failure_still_answers() {
    let mut provider = establishments_fixture();
    provider
        .establishments
        .insert(EducationDataset::Sec, FetchOutcome::Timeout);
    let (status, body) = get_json(
        setup_app(Arc::new(provider)),
        "/dashboard/enseignement?entity_code=13&entity_type=departement",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_etablissements"], 2);
}

#[tokio::test]
async fn test_education_total_failure_is_bad_gateway() {
    let mut provider = establishments_fixture();
    provider
        .establishments
        .insert(EducationDataset::Sup, FetchOutcome::Fatal("bad json".to_string()));
    let (status, body) = get_json(
        setup_app(Arc::new(provider)),
        "/dashboard/enseignement?entity_code=75056&level=sup",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_education_invalid_level() {
    let (status, body) = get_json(
        setup_app(Arc::new(establishments_fixture())),
        "/dashboard/enseignement?entity_code=75056&level=college",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("level"));
}

// =============================================================================
// France Travail
// =============================================================================

#[tokio::test]
async fn test_job_seekers_default_epci() {
    let mut provider = StubProvider::default();
    provider.job_seekers = Some(FetchOutcome::Ok(json!({"listeValeursParPeriode": [
        {"libPeriode": "1er trimestre 2025", "valeurPrincipaleNombre": 100,
         "listeValeurParCaract": [{"codeTypeCaract": "GENRE", "libCaract": "Hommes", "nombre": 50},
                                  {"codeTypeCaract": "GENRE", "libCaract": "Femmes", "nombre": 50}]},
        {"libPeriode": "2e trimestre 2025", "valeurPrincipaleNombre": 200,
         "listeValeurParCaract": [{"codeTypeCaract": "NIVFORM", "codeCaract": "1", "libCaract": "Bac", "nombre": 20}]}
    ]})));
    let provider = Arc::new(provider);

    let (status, body) = get_json(
        setup_app(provider.clone()),
        "/dashboard/demandeurs-emploi?entity_code=200054807",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    let year = &body["data"]["2025"];
    assert_eq!(year["annee"], "2025");
    assert_eq!(year["valeurPrincipaleNombre"], 150);
    assert_eq!(year["nb_periodes"], 2);
    assert_eq!(year["filtered_caracts"][0]["codeTypeCaract"], "TOTAL");
    assert_eq!(year["filtered_caracts"][0]["nombre"], 100);
    assert_eq!(provider.calls(), vec!["job_seekers EPCI 200054807"]);
}

#[tokio::test]
async fn test_job_seekers_not_available_for_commune() {
    let provider = Arc::new(StubProvider::default());
    let (status, body) = get_json(
        setup_app(provider.clone()),
        "/dashboard/demandeurs-emploi?entity_code=75056&entity_type=commune",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "not_available");
    assert_eq!(body["message"], "Les données ne sont pas disponibles au niveau communal");
    assert!(body["data"].is_null());
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_job_seekers_upstream_failures_are_envelopes() {
    let cases = [
        (FetchOutcome::Timeout, "timeout"),
        (FetchOutcome::ServiceUnavailable, "service_unavailable"),
        (FetchOutcome::Error("HTTP 401".to_string()), "error"),
        (FetchOutcome::Fatal("bad json".to_string()), "error"),
    ];
    for (outcome, expected) in cases {
        let provider = StubProvider {
            job_seekers: Some(outcome),
            ..Default::default()
        };
        let (status, body) = get_json(
            setup_app(Arc::new(provider)),
            "/dashboard/demandeurs-emploi?entity_code=13&entity_type=departement",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], expected);
        assert_eq!(body["message"], "L'API France Travail n'a pas répondu");
        assert!(body["data"].is_null());
    }
}

#[tokio::test]
async fn test_perspectives_not_available_below_departement() {
    for (code, kind) in [("75056", "commune"), ("200054781", "epci")] {
        let provider = Arc::new(StubProvider::default());
        let uri = format!(
            "/dashboard/perspectives-employeur?entity_code={}&entity_type={}",
            code, kind
        );
        let (status, body) = get_json(setup_app(provider.clone()), &uri).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "not_available");
        assert!(provider.calls().is_empty());
    }
}

#[tokio::test]
async fn test_perspectives_default_departement() {
    let mut provider = StubProvider::default();
    provider.perspectives = Some(FetchOutcome::Ok(json!({"listeValeursParPeriode": [
        {"codeTypeTerritoire": "DEP", "codeTerritoire": "13", "libTerritoire": "Bouches-du-Rhône",
         "codeTypePeriode": "ANNEE", "codePeriode": "2024", "codeNomenclature": "B",
         "libNomenclature": "Tension B", "valeurPrincipaleNom": null, "valeurPrincipaleDecimale": 0.5},
        {"codeTypeTerritoire": "DEP", "codeTerritoire": "13", "libTerritoire": "Bouches-du-Rhône",
         "codeTypePeriode": "ANNEE", "codePeriode": "2024", "codeNomenclature": "A",
         "libNomenclature": "Tension A", "valeurPrincipaleNom": "Forte", "valeurPrincipaleDecimale": 0.8}
    ]})));
    let provider = Arc::new(provider);

    let (status, body) = get_json(
        setup_app(provider.clone()),
        "/dashboard/perspectives-employeur?entity_code=13",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["libTerritoire"], "Bouches-du-Rhône");
    assert_eq!(body["data"]["data"]["2024"][0]["codeNomenclature"], "A");
    assert_eq!(body["data"]["data"]["2024"][0]["valeurPrincipaleNom"], "Forte");
    assert_eq!(provider.calls(), vec!["perspectives DEP 13"]);
}

#[tokio::test]
async fn test_perspectives_empty_payload() {
    let provider = StubProvider {
        perspectives: Some(FetchOutcome::Ok(json!({"listeValeursParPeriode": []}))),
        ..Default::default()
    };
    let (status, body) = get_json(
        setup_app(Arc::new(provider)),
        "/dashboard/perspectives-employeur?entity_code=93&entity_type=region",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"], json!({}));
}
