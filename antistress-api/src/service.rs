//! Request orchestration
//!
//! Each operation is one linear pipeline over already-validated records.
//! The first failing step ends the pipeline; earlier writes are kept and no
//! step is retried.

use antistress_common::messages::Failure;
use antistress_common::{
    FeatureVector, Locale, WorkerIdentity, WorkerWithFeatures, WorkerWithHistory,
    WorkerWithPrediction,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

use crate::db::{StorageError, WorkerStore};
use crate::model::ModelError;
use crate::prediction::StressPredictor;

/// Failure of an orchestrated operation
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl ServiceError {
    /// Fixed message shown to the client
    pub fn failure(&self) -> Failure {
        match self {
            ServiceError::Storage(e) => e.operation.failure(),
            ServiceError::Model(_) => Failure::Predict,
        }
    }
}

/// Orchestrates validation output, storage and prediction
pub struct WorkerService {
    store: Arc<dyn WorkerStore>,
    predictor: StressPredictor,
}

impl WorkerService {
    pub fn new(store: Arc<dyn WorkerStore>, predictor: StressPredictor) -> Self {
        Self { store, predictor }
    }

    pub fn locale(&self) -> Locale {
        self.predictor.locale()
    }

    /// Persist a survey, predict the stress level and persist the prediction
    ///
    /// Features are saved before predicting. If prediction or its save fails
    /// afterwards, the saved features stay.
    pub async fn submit_features(
        &self,
        worker: WorkerWithFeatures,
    ) -> Result<WorkerWithPrediction, ServiceError> {
        self.store
            .save_features(worker.identity(), worker.info_date, worker.scores())
            .await?;

        let features = FeatureVector::from(worker.scores());
        let label = self.predictor.predict_label(&features).map_err(|e| {
            error!("Prediction failed for {}: {}", worker.identity(), e);
            e
        })?;

        let prediction = worker.worker.identity.with_prediction(label);
        self.store.save_prediction(&prediction).await?;

        info!("Stress level for {}: {}", prediction.identity, prediction.stress_level);
        Ok(prediction)
    }

    /// Register a worker; returns the success message
    pub async fn create_worker(&self, worker: WorkerWithHistory) -> Result<String, ServiceError> {
        self.store.create_worker(&worker).await?;
        info!("Worker added: {}", worker.identity);
        Ok(self.locale().worker_added(&worker.identity))
    }

    /// Delete a worker; returns the success message
    pub async fn delete_worker(&self, worker: WorkerIdentity) -> Result<String, ServiceError> {
        self.store.delete_worker(&worker).await?;
        info!("Worker deleted: {}", worker);
        Ok(self.locale().worker_deleted(&worker))
    }
}
