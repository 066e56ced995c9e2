//! antistress-api library - worker stress level service
//!
//! Accepts worker survey data, stores it, predicts a stress level with the
//! trained classifier and stores the prediction.

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;
pub mod model;
pub mod prediction;
pub mod service;

pub use crate::error::{ApiError, ApiResult};

use crate::db::WorkerStore;
use crate::prediction::StressPredictor;
use crate::service::WorkerService;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Request orchestrator holding the store and the predictor
    pub service: Arc<WorkerService>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(store: Arc<dyn WorkerStore>, predictor: StressPredictor) -> Self {
        Self {
            service: Arc::new(WorkerService::new(store, predictor)),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::worker_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
