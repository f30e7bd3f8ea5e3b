//! HTTP request handlers for the PIA engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{calculate, calculate_batch};

use super::request::{BatchCalculationRequest, CalculationRequest, effective_config};
use super::response::{ApiError, ApiErrorResponse, BatchEntry, BatchResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/calculate", post(calculate_handler))
        .route("/calculate/batch", post(batch_handler))
        .with_state(state)
}

fn json_response<T: serde::Serialize>(status: StatusCode, body: T) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], Json(body)).into_response()
}

fn error_response(error: ApiErrorResponse) -> Response {
    json_response(error.status, error.error)
}

/// Maps a rejected JSON body to a 400 response.
fn rejection_response(rejection: JsonRejection, correlation_id: Uuid) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // Get the body text which contains the detailed error from serde
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    json_response(StatusCode::BAD_REQUEST, error)
}

/// Handler for POST /calculate endpoint.
///
/// Accepts one worker record and returns the full calculation result.
async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> Response {
    // Generate correlation ID for request tracking
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing calculation request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(rejection, correlation_id),
    };

    let loader = state.config();
    let config = effective_config(loader.engine(), request.validation);
    let start_time = Instant::now();

    match calculate(&request.worker, loader.law(), &config) {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                worker_id = %result.worker_id,
                governing_method = ?result.governing_method,
                pia = %result.governing_pia,
                duration_us = start_time.elapsed().as_micros(),
                "Calculation completed successfully"
            );
            json_response(StatusCode::OK, result)
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                worker_id = %request.worker.id,
                code = %err.code(),
                error = %err,
                "Calculation failed"
            );
            error_response(err.into())
        }
    }
}

/// Handler for POST /calculate/batch endpoint.
///
/// Computes every worker in parallel on a blocking thread, keeping the
/// async runtime free. Per-worker failures are reported in place.
async fn batch_handler(
    State(state): State<AppState>,
    payload: Result<Json<BatchCalculationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(rejection, correlation_id),
    };
    info!(
        correlation_id = %correlation_id,
        workers = request.workers.len(),
        "Processing batch request"
    );

    let loader = state.shared_config();
    let start_time = Instant::now();
    let computed = tokio::task::spawn_blocking(move || {
        let config = effective_config(loader.engine(), request.validation);
        let outcomes = calculate_batch(&request.workers, loader.law(), &config);
        request
            .workers
            .iter()
            .zip(outcomes)
            .map(|(worker, outcome)| BatchEntry::new(worker.id.clone(), outcome))
            .collect::<Vec<_>>()
    })
    .await;

    match computed {
        Ok(entries) => {
            let response = BatchResponse::from(entries);
            info!(
                correlation_id = %correlation_id,
                succeeded = response.succeeded,
                failed = response.failed,
                duration_us = start_time.elapsed().as_micros(),
                "Batch completed"
            );
            json_response(StatusCode::OK, response)
        }
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Batch task failed");
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CALCULATION_ERROR", "Batch calculation failed", err.to_string()),
            )
        }
    }
}
