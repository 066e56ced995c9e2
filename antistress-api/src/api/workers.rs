//! Worker endpoints
//!
//! - `POST /worker_stress_level/`: survey in, stress level out
//! - `POST /create_worker/`: register a worker
//! - `DELETE /delete_worker/`: remove a worker

use antistress_common::{WorkerIdentity, WorkerWithFeatures, WorkerWithHistory, WorkerWithPrediction};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};

use super::extract::ValidatedJson;
use super::health::MessageResponse;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// POST /worker_stress_level/
///
/// **Request:** identity, `mental_health_history`, `info_date` and the survey scores
/// **Response:** identity plus `stress_level`
///
/// **Errors:**
/// - 422: invalid body, nothing stored
/// - 500: features or prediction could not be saved, or prediction failed
pub async fn worker_stress_level(
    State(state): State<AppState>,
    ValidatedJson(worker): ValidatedJson<WorkerWithFeatures>,
) -> ApiResult<Json<WorkerWithPrediction>> {
    let service = &state.service;
    service
        .submit_features(worker)
        .await
        .map(Json)
        .map_err(|e| ApiError::service(&e, service.locale()))
}

/// POST /create_worker/
///
/// **Request:** identity and `mental_health_history`
/// **Response:** 201 with `{"message": ...}`
pub async fn create_worker(
    State(state): State<AppState>,
    ValidatedJson(worker): ValidatedJson<WorkerWithHistory>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let service = &state.service;
    let message = service
        .create_worker(worker)
        .await
        .map_err(|e| ApiError::service(&e, service.locale()))?;
    Ok((StatusCode::CREATED, Json(MessageResponse { message })))
}

/// DELETE /delete_worker/
///
/// **Request:** identity
/// **Response:** 200 with `{"message": ...}`
pub async fn delete_worker(
    State(state): State<AppState>,
    ValidatedJson(worker): ValidatedJson<WorkerIdentity>,
) -> ApiResult<Json<MessageResponse>> {
    let service = &state.service;
    let message = service
        .delete_worker(worker)
        .await
        .map_err(|e| ApiError::service(&e, service.locale()))?;
    Ok(Json(MessageResponse { message }))
}

/// Build worker routes; each path also answers without the trailing slash
pub fn worker_routes() -> Router<AppState> {
    Router::new()
        .route("/worker_stress_level/", post(worker_stress_level))
        .route("/worker_stress_level", post(worker_stress_level))
        .route("/create_worker/", post(create_worker))
        .route("/create_worker", post(create_worker))
        .route("/delete_worker/", delete(delete_worker))
        .route("/delete_worker", delete(delete_worker))
}
