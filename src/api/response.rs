//! Response types for the PIA engine API.
//!
//! This module defines the error response structures, the batch response
//! and the mapping from engine errors to HTTP statuses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::CalculationResult;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Numeric engine error code, for message lookup by presentation code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<u16>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            error_code: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            details: Some(details.into()),
            ..Self::new(code, message)
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let engine_code = error.code().as_u16();
        let (status, code, details) = match &error {
            EngineError::OutOfRange { field, .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "OUT_OF_RANGE",
                format!("Field '{}' is outside its permitted range", field),
            ),
            EngineError::Sequencing { field, .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "SEQUENCING_ERROR",
                format!("Field '{}' is chronologically inconsistent", field),
            ),
            EngineError::MissingLawParameter { table, .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "MISSING_LAW_PARAMETER",
                format!("The '{}' table does not reach the requested year", table),
            ),
            EngineError::InvalidLawParameter { .. }
            | EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIG_ERROR",
                "The law parameters loaded by the server are unusable".to_string(),
            ),
            EngineError::CalculationError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CALCULATION_ERROR",
                "Calculation failed".to_string(),
            ),
        };
        ApiErrorResponse {
            status,
            error: ApiError {
                error_code: Some(engine_code),
                ..ApiError::with_details(code, error.to_string(), details)
            },
        }
    }
}

/// One worker's outcome in a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEntry {
    /// The worker the outcome is for.
    pub worker_id: String,
    /// The result, when the computation succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<CalculationResult>,
    /// The error, when it failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl BatchEntry {
    /// Builds an entry from one worker's outcome.
    pub fn new(worker_id: impl Into<String>, outcome: Result<CalculationResult, EngineError>) -> Self {
        let worker_id = worker_id.into();
        match outcome {
            Ok(result) => Self {
                worker_id,
                result: Some(result),
                error: None,
            },
            Err(err) => Self {
                worker_id,
                result: None,
                error: Some(ApiErrorResponse::from(err).error),
            },
        }
    }
}

/// Response body for the `/calculate/batch` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    /// Number of workers computed successfully.
    pub succeeded: usize,
    /// Number of workers that failed.
    pub failed: usize,
    /// One entry per worker, in request order.
    pub results: Vec<BatchEntry>,
}

impl From<Vec<BatchEntry>> for BatchResponse {
    fn from(results: Vec<BatchEntry>) -> Self {
        let failed = results.iter().filter(|e| e.error.is_some()).count();
        Self {
            succeeded: results.len() - failed,
            failed,
            results,
        }
    }
}
