//! # HTTP API Errors
//!
//! Maps failures to responses. Client input errors answer 400 with the
//! structured error list; every other failure answers with an empty body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::{debug, error};

use crate::models::ValidationErrors;
use crate::store::StoreError;

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Query, path or payload failed validation
    #[error("Invalid request: {0}")]
    Invalid(#[from] ValidationErrors),

    /// Request body could not be parsed
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Flight or seat does not exist
    #[error("Resource not found")]
    NotFound,

    // ==================
    // Server Errors (5xx)
    // ==================
    #[error("Store failure: {0}")]
    Store(#[from] StoreError),

    /// Blocking task failed
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Invalid(_) | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            ApiError::Invalid(errors) => {
                debug!(codes = %errors, "Request rejected");
                (status, Json(errors)).into_response()
            }
            ApiError::Store(err) => {
                error!(code = err.code(), error = %err, "Store failure");
                status.into_response()
            }
            other => {
                if status.is_server_error() {
                    error!(error = %other, "Request failed");
                } else {
                    debug!(error = %other, "Request rejected");
                }
                status.into_response()
            }
        }
    }
}
