use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;
use thiserror::Error;

use crate::keys::KeyFormatError;
use crate::store::StoreError;

/// Failures that abort a whole analysis request
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Format(#[from] KeyFormatError),

    #[error("no instances found for GPU type {gpu_type} with count {gpu_count}")]
    NoCandidates { gpu_type: String, gpu_count: u32 },

    #[error("no matching instance found for data location {0}")]
    DataLocalNotFound(String),

    #[error("compute price missing for data-local instance {0}")]
    DataLocalPriceMissing(String),

    #[error("price lookup failed: {0}")]
    Lookup(#[from] StoreError),
}

impl EngineError {
    /// Short label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Format(_) => "format_error",
            Self::NoCandidates { .. } => "no_candidates",
            Self::DataLocalNotFound(_) => "data_local_not_found",
            Self::DataLocalPriceMissing(_) => "data_local_price_missing",
            Self::Lookup(_) => "lookup_failure",
        }
    }
}

/// Application error types
#[derive(Debug)]
pub enum AppError {
    /// Malformed or incomplete request
    BadRequest(String),
    /// Nothing to compare against (no candidates, no data-local instance)
    NotFound(String),
    /// Price store unreachable or returned garbage
    StoreUnavailable(String),
    /// Internal server error
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::NotFound(msg) => write!(f, "Not found: {}", msg),
            Self::StoreUnavailable(msg) => write!(f, "Store unavailable: {}", msg),
            Self::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::StoreUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            Self::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "type": error_type_name(&self),
            }
        }));

        (status, body).into_response()
    }
}

pub fn error_type_name(error: &AppError) -> &'static str {
    match error {
        AppError::BadRequest(_) => "bad_request",
        AppError::NotFound(_) => "not_found",
        AppError::StoreUnavailable(_) => "store_unavailable",
        AppError::InternalError(_) => "internal_error",
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Format(e) => Self::BadRequest(e.to_string()),
            e @ EngineError::NoCandidates { .. } => Self::NotFound(e.to_string()),
            e @ EngineError::DataLocalNotFound(_) => Self::NotFound(e.to_string()),
            e @ EngineError::DataLocalPriceMissing(_) => Self::NotFound(e.to_string()),
            EngineError::Lookup(e) => Self::StoreUnavailable(e.to_string()),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}
