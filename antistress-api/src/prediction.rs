//! Stress level prediction
//!
//! Wraps the classifier loaded at startup and maps its class index to a
//! [`StressLevel`]. The classifier is immutable and shared by every request.

use antistress_common::{FeatureVector, Locale, StressLevel};
use std::sync::Arc;
use tracing::{debug, error};

use crate::model::{Classifier, ModelError};

#[derive(Clone)]
pub struct StressPredictor {
    classifier: Arc<dyn Classifier>,
    locale: Locale,
}

impl StressPredictor {
    pub fn new(classifier: Arc<dyn Classifier>, locale: Locale) -> Self {
        Self { classifier, locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Classify one feature vector
    pub fn predict(&self, features: &FeatureVector) -> Result<StressLevel, ModelError> {
        let index = self.classifier.predict(features)?;
        let level = StressLevel::from_class_index(index).ok_or_else(|| {
            error!("Classifier returned class index {} outside 0..=2", index);
            ModelError::InvalidClassIndex(index)
        })?;
        debug!(?features, ?level, "Stress level predicted");
        Ok(level)
    }

    /// Classify and render the label in the configured locale
    pub fn predict_label(&self, features: &FeatureVector) -> Result<&'static str, ModelError> {
        self.predict(features).map(|level| level.label(self.locale))
    }
}
