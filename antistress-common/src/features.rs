//! Feature vector fed to the stress classifier
//!
//! The position of each score is a contract with the trained model artifact:
//! the classifier was fitted on columns in exactly this order.

use crate::worker::SurveyScores;

/// Number of features the classifier consumes
pub const FEATURE_COUNT: usize = 10;

/// Feature names by vector position
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "anxiety",
    "self_esteem",
    "depression",
    "headache",
    "blood_pressure",
    "sleep_quality",
    "breathing_problem",
    "noise_level",
    "social_support",
    "extracurricular_activities",
];

/// Survey scores in classifier column order
///
/// Identity fields, `info_date` and `mental_health_history` are not part of
/// the vector. Every score is at most 30, so `u8` holds all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureVector([u8; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: [u8; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<u8> {
        self.0.get(index).copied()
    }

    /// Values widened for model arithmetic
    pub fn to_f64(&self) -> [f64; FEATURE_COUNT] {
        self.0.map(f64::from)
    }

    /// `(name, value)` pairs in column order
    pub fn iter_named(&self) -> impl Iterator<Item = (&'static str, u8)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.0.iter().copied())
    }
}

impl From<&SurveyScores> for FeatureVector {
    fn from(scores: &SurveyScores) -> Self {
        Self([
            scores.anxiety,
            scores.self_esteem,
            scores.depression,
            scores.headache,
            scores.blood_pressure,
            scores.sleep_quality,
            scores.breathing_problem,
            scores.noise_level,
            scores.social_support,
            scores.extracurricular_activities,
        ])
    }
}
