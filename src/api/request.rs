//! Request types for the PIA engine API.
//!
//! This module defines the JSON request structures for the `/calculate`
//! and `/calculate/batch` endpoints.

use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, ValidationLevel};
use crate::models::WorkerRecord;

/// Request body for the `/calculate` endpoint.
///
/// # Example
///
/// ```
/// use pia_engine::api::CalculationRequest;
///
/// let json = r#"{
///     "worker": {
///         "id": "w-001",
///         "birth_date": "1958-04-10",
///         "benefit_type": "old_age",
///         "entitlement_date": "2024-04"
///     }
/// }"#;
/// let request: CalculationRequest = serde_json::from_str(json).unwrap();
/// assert_eq!(request.worker.id, "w-001");
/// assert!(request.validation.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// The worker record, family members included.
    pub worker: WorkerRecord,
    /// Overrides the configured validation level for this request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationLevel>,
}

/// Request body for the `/calculate/batch` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchCalculationRequest {
    /// Worker records, computed independently.
    pub workers: Vec<WorkerRecord>,
    /// Overrides the configured validation level for every worker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationLevel>,
}

/// The engine settings for a request: the configured settings with any
/// requested validation level applied.
pub(super) fn effective_config(base: &EngineConfig, validation: Option<ValidationLevel>) -> EngineConfig {
    EngineConfig {
        validation: validation.unwrap_or(base.validation),
        ..*base
    }
}
