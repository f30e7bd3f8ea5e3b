//! HTTP API module for the PIA engine.
//!
//! This module provides the REST API endpoints for computing benefits for
//! one worker or a batch of workers. It holds no calculation logic.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{BatchCalculationRequest, CalculationRequest};
pub use response::{ApiError, BatchEntry, BatchResponse};
pub use state::AppState;
