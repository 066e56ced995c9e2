//! # Antistress Common Library
//!
//! Shared code for the Antistress services including:
//! - Worker record shapes and their validation
//! - Feature vector extraction for the stress classifier
//! - Stress level labels and user-facing message catalogs
//! - Configuration loading

pub mod config;
pub mod error;
pub mod features;
pub mod messages;
pub mod stress;
pub mod validation;
pub mod worker;

pub use error::{Error, Result};
pub use features::FeatureVector;
pub use messages::Locale;
pub use stress::StressLevel;
pub use validation::{FieldError, ValidationErrors};
pub use worker::{
    SurveyScores, WorkerIdentity, WorkerWithFeatures, WorkerWithHistory, WorkerWithPrediction,
};
