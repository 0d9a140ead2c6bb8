//! reqwest-backed [`DataProvider`]
//!
//! One client per timeout class: INSEE and ONISEP share the general upstream
//! timeout, France Travail (token and data calls) uses its own shorter one.

use super::schema::{
    EducationDataset, Establishment, JobSeekerResponse, MelodiResponse, OnisepResponse,
    PerspectiveResponse,
};
use super::{DataProvider, FetchOutcome, GeoFacet, LaborMarketRequest, MelodiQuery, TokenCache};
use async_trait::async_trait;
use geodash_common::config::{FranceTravailCredentials, UpstreamConfig};
use geodash_common::{Error, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const USER_AGENT: &str = concat!("geodash/", env!("CARGO_PKG_VERSION"));

const DEMANDEURS_ENDPOINT: &str = "/v1/indicateur/stat-demandeurs";
const PERSPECTIVES_ENDPOINT: &str = "/v1/indicateur/stat-perspective-employeur";
const FRANCE_TRAVAIL_REALM: &str = "/partenaire";
const FRANCE_TRAVAIL_SCOPES: &str = "api_stats-offres-demandes-emploiv1 offresetdemandesemploi";

const ONISEP_SEC_DATASET: &str = "5fa5816ac6a6e";
const ONISEP_SUP_DATASET: &str = "5fa586da5c4b6";
const ONISEP_PAGE_SIZE: &str = "5000";

/// OAuth2 token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// HTTP data provider for INSEE Melodi, France Travail and ONISEP
pub struct HttpDataProvider {
    client: Client,
    france_travail_client: Client,
    config: UpstreamConfig,
    credentials: Option<FranceTravailCredentials>,
    token_cache: Mutex<TokenCache>,
}

impl HttpDataProvider {
    /// Create the provider
    ///
    /// Missing France Travail credentials are not an error: labor-market
    /// calls then resolve to [`FetchOutcome::Error`].
    pub fn new(
        config: UpstreamConfig,
        credentials: Option<FranceTravailCredentials>,
    ) -> Result<Self> {
        if credentials.is_none() {
            warn!("France Travail credentials not configured; labor-market data unavailable");
        }

        Ok(Self {
            client: build_client(config.timeout())?,
            france_travail_client: build_client(config.france_travail_timeout())?,
            config,
            credentials,
            token_cache: Mutex::new(TokenCache::new()),
        })
    }

    /// Cached France Travail token, refreshed when close to expiry
    ///
    /// The cache lock is held during refresh so concurrent requests wait for
    /// one token instead of each requesting their own.
    async fn access_token(&self) -> FetchOutcome<String> {
        let Some(credentials) = &self.credentials else {
            return FetchOutcome::Error("France Travail credentials not configured".to_string());
        };

        let mut cache = self.token_cache.lock().await;
        if let Some(token) = cache.valid_token(Instant::now()) {
            return FetchOutcome::Ok(token.to_string());
        }

        debug!("Requesting France Travail access token");
        let request = self
            .france_travail_client
            .post(&self.config.france_travail_token_url)
            .query(&[("realm", FRANCE_TRAVAIL_REALM)])
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
                ("scope", FRANCE_TRAVAIL_SCOPES),
            ]);

        let response: TokenResponse = match send_json(request).await.into_result() {
            Ok(response) => response,
            Err(failure) => {
                warn!(kind = ?failure.failure_kind(), "France Travail token request failed");
                return failure;
            }
        };

        match response.access_token.filter(|t| !t.is_empty()) {
            Some(token) => {
                let expires_in = response.expires_in.map(Duration::from_secs);
                cache.store(token.clone(), expires_in, Instant::now());
                info!(expires_in = ?expires_in, "France Travail access token refreshed");
                FetchOutcome::Ok(token)
            }
            None => FetchOutcome::Error("No access token in response".to_string()),
        }
    }

    async fn france_travail_post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &LaborMarketRequest,
    ) -> FetchOutcome<T> {
        let token = match self.access_token().await.into_result() {
            Ok(token) => token,
            Err(failure) => return failure,
        };

        let url = format!("{}{}", self.config.france_travail_base_url, endpoint);
        debug!(
            url = %url,
            territory_type = %body.code_type_territoire,
            territory = %body.code_territoire,
            "Querying France Travail"
        );

        let request = self
            .france_travail_client
            .post(&url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(body);

        let outcome = send_json(request).await;
        if let Some(kind) = outcome.failure_kind() {
            warn!(url = %url, kind, "France Travail request failed");
        }
        outcome
    }
}

#[async_trait]
impl DataProvider for HttpDataProvider {
    async fn melodi(&self, query: &MelodiQuery) -> FetchOutcome<MelodiResponse> {
        let url = format!("{}/{}", self.config.insee_base_url, query.dataset.id());
        debug!(url = %url, geo = %query.geo, "Querying INSEE Melodi");

        let outcome = send_json(self.client.get(&url).query(&query.params())).await;
        if let Some(kind) = outcome.failure_kind() {
            warn!(url = %url, geo = %query.geo, kind, "INSEE Melodi request failed");
        }
        outcome
    }

    async fn job_seekers(&self, request: &LaborMarketRequest) -> FetchOutcome<JobSeekerResponse> {
        self.france_travail_post(DEMANDEURS_ENDPOINT, request).await
    }

    async fn employer_perspectives(
        &self,
        request: &LaborMarketRequest,
    ) -> FetchOutcome<PerspectiveResponse> {
        self.france_travail_post(PERSPECTIVES_ENDPOINT, request).await
    }

    async fn establishments(
        &self,
        dataset: EducationDataset,
        facet: &GeoFacet,
    ) -> FetchOutcome<Vec<Establishment>> {
        let dataset_id = match dataset {
            EducationDataset::Sec => ONISEP_SEC_DATASET,
            EducationDataset::Sup => ONISEP_SUP_DATASET,
        };
        let url = format!("{}/{}/search", self.config.onisep_base_url, dataset_id);
        let (facet_param, facet_value) = facet.param(dataset);
        debug!(url = %url, facet = %facet, dataset = dataset.as_str(), "Querying ONISEP");

        let request = self.client.get(&url).query(&[
            (facet_param, facet_value.as_str()),
            ("size", ONISEP_PAGE_SIZE),
        ]);

        let outcome = send_json::<OnisepResponse>(request).await.map(|response| {
            response
                .results
                .into_iter()
                .map(|mut establishment| {
                    establishment.source = Some(dataset);
                    establishment
                })
                .collect::<Vec<_>>()
        });

        match &outcome {
            FetchOutcome::Ok(results) => {
                debug!(dataset = dataset.as_str(), count = results.len(), "ONISEP results")
            }
            failure => warn!(
                url = %url,
                dataset = dataset.as_str(),
                kind = ?failure.failure_kind(),
                "ONISEP request failed"
            ),
        }
        outcome
    }
}

fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Send a request and decode its JSON body, classifying every failure
async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> FetchOutcome<T> {
    let response = match request.send().await {
        Ok(response) => response,
        Err(e) if e.is_timeout() => return FetchOutcome::Timeout,
        Err(e) => return FetchOutcome::Error(format!("Request failed: {}", e)),
    };

    let status = response.status();
    if let Some(failure) = classify_status(status) {
        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), body = %body, "Upstream returned an error status");
        return failure;
    }

    match response.json::<T>().await {
        Ok(payload) => FetchOutcome::Ok(payload),
        Err(e) if e.is_timeout() => FetchOutcome::Timeout,
        Err(e) => FetchOutcome::Fatal(format!("Unexpected response body: {}", e)),
    }
}

/// `None` for success statuses, otherwise the failure class
fn classify_status<T>(status: StatusCode) -> Option<FetchOutcome<T>> {
    match status {
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
            Some(FetchOutcome::ServiceUnavailable)
        }
        s if s.is_success() => None,
        s => Some(FetchOutcome::Error(format!("HTTP {}", s.as_u16()))),
    }
}
