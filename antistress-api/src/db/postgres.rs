//! PostgreSQL implementation of the gateway

use antistress_common::{SurveyScores, WorkerIdentity, WorkerWithHistory, WorkerWithPrediction};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::PgPool;
use tracing::error;

use super::{StorageError, StoreOperation, WorkerStore};

/// Calls the `antistress` stored procedures over a shared pool
#[derive(Clone)]
pub struct PgWorkerStore {
    pool: PgPool,
}

impl PgWorkerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Log the driver error and keep only the failed operation
fn storage_error(operation: StoreOperation) -> impl FnOnce(sqlx::Error) -> StorageError {
    move |e| {
        error!(procedure = operation.procedure(), "Storage call failed: {}", e);
        StorageError::new(operation)
    }
}

#[async_trait]
impl WorkerStore for PgWorkerStore {
    async fn create_worker(&self, worker: &WorkerWithHistory) -> Result<(), StorageError> {
        sqlx::query("CALL add_worker($1, $2, $3, $4)")
            .bind(&worker.identity.first_name)
            .bind(&worker.identity.last_name)
            .bind(&worker.identity.surname)
            .bind(worker.mental_health_history)
            .execute(&self.pool)
            .await
            .map_err(storage_error(StoreOperation::CreateWorker))?;
        Ok(())
    }

    async fn delete_worker(&self, worker: &WorkerIdentity) -> Result<(), StorageError> {
        sqlx::query("CALL delete_worker($1, $2, $3)")
            .bind(&worker.first_name)
            .bind(&worker.last_name)
            .bind(&worker.surname)
            .execute(&self.pool)
            .await
            .map_err(storage_error(StoreOperation::DeleteWorker))?;
        Ok(())
    }

    async fn save_features(
        &self,
        worker: &WorkerIdentity,
        info_date: NaiveDateTime,
        scores: &SurveyScores,
    ) -> Result<(), StorageError> {
        // Scores bind as SMALLINT; Postgres has no unsigned byte type
        sqlx::query(
            "CALL save_features($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(&worker.first_name)
        .bind(&worker.last_name)
        .bind(&worker.surname)
        .bind(info_date)
        .bind(i16::from(scores.anxiety))
        .bind(i16::from(scores.self_esteem))
        .bind(i16::from(scores.depression))
        .bind(i16::from(scores.headache))
        .bind(i16::from(scores.blood_pressure))
        .bind(i16::from(scores.sleep_quality))
        .bind(i16::from(scores.breathing_problem))
        .bind(i16::from(scores.noise_level))
        .bind(i16::from(scores.social_support))
        .bind(i16::from(scores.extracurricular_activities))
        .execute(&self.pool)
        .await
        .map_err(storage_error(StoreOperation::SaveFeatures))?;
        Ok(())
    }

    async fn save_prediction(&self, prediction: &WorkerWithPrediction) -> Result<(), StorageError> {
        sqlx::query("CALL save_prediction($1, $2, $3, $4)")
            .bind(&prediction.identity.first_name)
            .bind(&prediction.identity.last_name)
            .bind(&prediction.identity.surname)
            .bind(&prediction.stress_level)
            .execute(&self.pool)
            .await
            .map_err(storage_error(StoreOperation::SavePrediction))?;
        Ok(())
    }
}
