//! Shared test fixtures: recording store, stub classifier, request builders
#![allow(dead_code)]

use antistress_api::db::{StorageError, StoreOperation, WorkerStore};
use antistress_api::model::{Classifier, ModelError};
use antistress_api::prediction::StressPredictor;
use antistress_api::{build_router, AppState};
use antistress_common::{
    FeatureVector, Locale, SurveyScores, WorkerIdentity, WorkerWithHistory, WorkerWithPrediction,
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use chrono::NaiveDateTime;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// A successful store call
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    CreateWorker(WorkerWithHistory),
    DeleteWorker(WorkerIdentity),
    SaveFeatures(WorkerIdentity, NaiveDateTime, SurveyScores),
    SavePrediction(WorkerWithPrediction),
}

/// In-memory store recording every call, with per-operation failure injection
///
/// Deleting an unknown worker succeeds, like a `DELETE` matching no rows.
#[derive(Default)]
pub struct RecordingStore {
    attempts: Mutex<Vec<StoreOperation>>,
    calls: Mutex<Vec<StoreCall>>,
    failing: Mutex<Vec<StoreOperation>>,
}

impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every future call of `operation` fail
    pub fn fail_on(&self, operation: StoreOperation) {
        self.failing.lock().unwrap().push(operation);
    }

    /// Operations attempted, successful or not
    pub fn attempts(&self) -> Vec<StoreOperation> {
        self.attempts.lock().unwrap().clone()
    }

    /// Calls that succeeded
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, operation: StoreOperation) -> usize {
        self.calls()
            .iter()
            .filter(|call| call_operation(call) == operation)
            .count()
    }

    fn record(&self, operation: StoreOperation, call: StoreCall) -> Result<(), StorageError> {
        self.attempts.lock().unwrap().push(operation);
        if self.failing.lock().unwrap().contains(&operation) {
            return Err(StorageError::new(operation));
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

fn call_operation(call: &StoreCall) -> StoreOperation {
    match call {
        StoreCall::CreateWorker(_) => StoreOperation::CreateWorker,
        StoreCall::DeleteWorker(_) => StoreOperation::DeleteWorker,
        StoreCall::SaveFeatures(..) => StoreOperation::SaveFeatures,
        StoreCall::SavePrediction(_) => StoreOperation::SavePrediction,
    }
}

#[async_trait]
impl WorkerStore for RecordingStore {
    async fn create_worker(&self, worker: &WorkerWithHistory) -> Result<(), StorageError> {
        self.record(StoreOperation::CreateWorker, StoreCall::CreateWorker(worker.clone()))
    }

    async fn delete_worker(&self, worker: &WorkerIdentity) -> Result<(), StorageError> {
        self.record(StoreOperation::DeleteWorker, StoreCall::DeleteWorker(worker.clone()))
    }

    async fn save_features(
        &self,
        worker: &WorkerIdentity,
        info_date: NaiveDateTime,
        scores: &SurveyScores,
    ) -> Result<(), StorageError> {
        self.record(
            StoreOperation::SaveFeatures,
            StoreCall::SaveFeatures(worker.clone(), info_date, *scores),
        )
    }

    async fn save_prediction(&self, prediction: &WorkerWithPrediction) -> Result<(), StorageError> {
        self.record(
            StoreOperation::SavePrediction,
            StoreCall::SavePrediction(prediction.clone()),
        )
    }
}

/// Classifier always answering with one class index, remembering its inputs
pub struct FixedClassifier {
    index: i64,
    seen: Mutex<Vec<FeatureVector>>,
}

impl FixedClassifier {
    pub fn new(index: i64) -> Arc<Self> {
        Arc::new(Self {
            index,
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn seen(&self) -> Vec<FeatureVector> {
        self.seen.lock().unwrap().clone()
    }
}

impl Classifier for FixedClassifier {
    fn predict(&self, features: &FeatureVector) -> Result<i64, ModelError> {
        self.seen.lock().unwrap().push(*features);
        Ok(self.index)
    }
}

pub fn predictor(classifier: Arc<FixedClassifier>, locale: Locale) -> StressPredictor {
    StressPredictor::new(classifier, locale)
}

/// Router over a recording store and a fixed classifier
pub fn setup_app(store: Arc<RecordingStore>, class_index: i64, locale: Locale) -> Router {
    let state = AppState::new(store, predictor(FixedClassifier::new(class_index), locale));
    build_router(state)
}

/// The sample survey used throughout the tests
pub fn sample_survey() -> Value {
    json!({
        "first_name": "Ivan",
        "last_name": "Petrov",
        "surname": "Sergeevich",
        "mental_health_history": false,
        "info_date": "2023-06-01 09:00:00",
        "anxiety": 10,
        "self_esteem": 20,
        "depression": 5,
        "headache": 2,
        "blood_pressure": 2,
        "sleep_quality": 3,
        "breathing_problem": 1,
        "noise_level": 2,
        "social_support": 1,
        "extracurricular_activities": 3
    })
}

pub fn sample_identity() -> Value {
    json!({
        "first_name": "Ivan",
        "last_name": "Petrov",
        "surname": "Sergeevich"
    })
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Extract JSON body from response
pub async fn extract_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}
