//! Persistence gateway
//!
//! Storage is an external PostgreSQL database exposing one stored procedure
//! per logical action. Each gateway operation is exactly one procedure call,
//! so every write is atomic on its own; nothing spans two calls.
//!
//! Failures are reduced to the operation that failed. The underlying driver
//! error is logged here and never handed to callers.

use antistress_common::config::DatabaseConfig;
use antistress_common::messages::Failure;
use antistress_common::{SurveyScores, WorkerIdentity, WorkerWithHistory, WorkerWithPrediction};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

mod postgres;
pub use postgres::PgWorkerStore;

/// Gateway operations, named after the stored procedure each one calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    CreateWorker,
    DeleteWorker,
    SaveFeatures,
    SavePrediction,
}

impl StoreOperation {
    pub fn procedure(self) -> &'static str {
        match self {
            StoreOperation::CreateWorker => "add_worker",
            StoreOperation::DeleteWorker => "delete_worker",
            StoreOperation::SaveFeatures => "save_features",
            StoreOperation::SavePrediction => "save_prediction",
        }
    }

    /// Fixed client-facing message for a failure of this operation
    pub fn failure(self) -> Failure {
        match self {
            StoreOperation::CreateWorker => Failure::AddWorker,
            StoreOperation::DeleteWorker => Failure::DeleteWorker,
            StoreOperation::SaveFeatures => Failure::SaveFeatures,
            StoreOperation::SavePrediction => Failure::SavePrediction,
        }
    }
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.procedure())
    }
}

/// A storage call failed; the cause has already been logged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Storage operation {operation} failed")]
pub struct StorageError {
    pub operation: StoreOperation,
}

impl StorageError {
    pub fn new(operation: StoreOperation) -> Self {
        Self { operation }
    }
}

/// Durable storage of workers, survey features and predictions
#[async_trait]
pub trait WorkerStore: Send + Sync {
    /// Register a new worker
    async fn create_worker(&self, worker: &WorkerWithHistory) -> Result<(), StorageError>;

    /// Remove the worker matching all three name parts
    ///
    /// Whether an unknown worker is an error is decided by the store.
    async fn delete_worker(&self, worker: &WorkerIdentity) -> Result<(), StorageError>;

    /// Record one survey submission
    async fn save_features(
        &self,
        worker: &WorkerIdentity,
        info_date: NaiveDateTime,
        scores: &SurveyScores,
    ) -> Result<(), StorageError>;

    /// Record a predicted stress level
    async fn save_prediction(&self, prediction: &WorkerWithPrediction) -> Result<(), StorageError>;
}

/// Open the connection pool shared by all requests
///
/// Connects eagerly so an unreachable database or bad credentials stop the
/// service at startup.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool> {
    let options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.username)
        .password(&config.password)
        .database(&config.name);

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await
        .with_context(|| {
            format!(
                "Failed to connect to database {} at {}:{}",
                config.name, config.host, config.port
            )
        })
}
