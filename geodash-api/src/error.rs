//! Error types for geodash-api
//!
//! Every error renders as `{"status": "error", "message": ...}` with the
//! matching HTTP status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or invalid query parameter (400)
    #[error("{0}")]
    BadRequest(String),

    /// Unknown entity code (404)
    #[error("{0}")]
    NotFound(String),

    /// INSEE or ONISEP failure (502)
    #[error("{0}")]
    Upstream(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// geodash-common error
    #[error(transparent)]
    Common(#[from] geodash_common::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Common(err) => match err {
                geodash_common::Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
                geodash_common::Error::NotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            ApiError::Common(geodash_common::Error::InvalidInput(msg))
            | ApiError::Common(geodash_common::Error::NotFound(msg)) => msg.clone(),
            other => other.to_string(),
        };

        if status.is_server_error() {
            error!(status = status.as_u16(), "{}", message);
        }

        let body = Json(json!({
            "status": "error",
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
