//! Territory name search

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use geodash_common::geo::{normalize_text, SearchResults};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub results: SearchResults,
}

/// GET /dashboard/search?q=...
///
/// Accent-insensitive substring search across all four levels.
pub async fn search(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<SearchResponse>, SearchError> {
    let Query(query) =
        query.map_err(|rejection| SearchError::InvalidQuery(rejection.body_text()))?;
    if normalize_text(query.q.trim()).trim().is_empty() {
        return Err(SearchError::EmptyQuery);
    }

    let results = state.geo.search(query.q.trim());
    debug!(
        q = %query.q,
        communes = results.communes.len(),
        epcis = results.epcis.len(),
        departements = results.departements.len(),
        regions = results.regions.len(),
        "Search completed"
    );

    Ok(Json(SearchResponse {
        status: "success",
        message: None,
        results,
    }))
}

/// Search errors keep the four result lists so clients can render them as-is
#[derive(Debug)]
pub enum SearchError {
    EmptyQuery,
    /// Query string could not be decoded
    InvalidQuery(String),
}

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            SearchError::EmptyQuery => {
                (StatusCode::BAD_REQUEST, "Missing query parameter".to_string())
            }
            SearchError::InvalidQuery(detail) => (StatusCode::BAD_REQUEST, detail),
        };

        let body = Json(SearchResponse {
            status: "error",
            message: Some(message),
            results: SearchResults::default(),
        });

        (status, body).into_response()
    }
}
