//! Worker record shapes
//!
//! Records are layered by capability and built by composition:
//!
//! ```text
//! WorkerIdentity ──┬── WorkerWithHistory ── WorkerWithFeatures (+ info_date, SurveyScores)
//!                  └── WorkerWithPrediction
//! ```
//!
//! All shapes are transient request/response payloads. Narrower shapes are
//! obtained through explicit projections, never by dropping map keys.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::validation::{Bounds, PayloadReader, Validate};

/// Textual format of `info_date` on the wire
pub const INFO_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse `info_date`, accepting exactly `YYYY-MM-DD HH:MM:SS`
///
/// Every position is checked before chrono sees the text: chrono alone
/// tolerates space-padded fields, a signed year and a doubled separator.
/// Second 60 (a leap second in chrono) is rejected after parsing.
pub fn parse_info_date(value: &str) -> Result<NaiveDateTime, String> {
    let bytes = value.as_bytes();
    let shaped = bytes.len() == 19
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            10 => *b == b' ',
            13 | 16 => *b == b':',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return Err(format!(
            "invalid datetime format, expected YYYY-MM-DD HH:MM:SS: {:?}",
            value
        ));
    }
    let parsed = NaiveDateTime::parse_from_str(value, INFO_DATE_FORMAT)
        .map_err(|e| format!("invalid datetime {:?}: {}", value, e))?;
    if parsed.nanosecond() >= 1_000_000_000 {
        return Err(format!("invalid datetime {:?}: second out of range", value));
    }
    Ok(parsed)
}

mod info_date_format {
    use super::INFO_DATE_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(INFO_DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_info_date(&text).map_err(serde::de::Error::custom)
    }
}

/// The three-part name identifying a worker
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkerIdentity {
    pub first_name: String,
    pub last_name: String,
    pub surname: String,
}

impl WorkerIdentity {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        surname: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            surname: surname.into(),
        }
    }

    /// Attach a predicted stress level label
    pub fn with_prediction(self, stress_level: impl Into<String>) -> WorkerWithPrediction {
        WorkerWithPrediction {
            identity: self,
            stress_level: stress_level.into(),
        }
    }

    /// Attach the mental health history flag
    pub fn with_history(self, mental_health_history: bool) -> WorkerWithHistory {
        WorkerWithHistory {
            identity: self,
            mental_health_history,
        }
    }
}

impl std::fmt::Display for WorkerIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.first_name, self.last_name, self.surname)
    }
}

impl Validate for WorkerIdentity {
    fn read(fields: &mut PayloadReader<'_>) -> Self {
        Self {
            first_name: fields.required_str("first_name"),
            last_name: fields.required_str("last_name"),
            surname: fields.required_str("surname"),
        }
    }
}

/// Identity plus the predicted stress level label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerWithPrediction {
    #[serde(flatten)]
    pub identity: WorkerIdentity,
    pub stress_level: String,
}

/// Identity plus mental health history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerWithHistory {
    #[serde(flatten)]
    pub identity: WorkerIdentity,
    pub mental_health_history: bool,
}

impl Validate for WorkerWithHistory {
    fn read(fields: &mut PayloadReader<'_>) -> Self {
        Self {
            identity: WorkerIdentity::read(fields),
            mental_health_history: fields.required_bool("mental_health_history"),
        }
    }
}

/// Survey scores, one closed range per question block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyScores {
    pub anxiety: u8,
    pub self_esteem: u8,
    pub depression: u8,
    pub headache: u8,
    pub blood_pressure: u8,
    pub sleep_quality: u8,
    pub breathing_problem: u8,
    pub noise_level: u8,
    pub social_support: u8,
    pub extracurricular_activities: u8,
}

impl SurveyScores {
    pub const ANXIETY: Bounds = Bounds::closed(0, 21);
    pub const SELF_ESTEEM: Bounds = Bounds::closed(0, 30);
    pub const DEPRESSION: Bounds = Bounds::closed(0, 27);
    pub const HEADACHE: Bounds = Bounds::closed(0, 5);
    pub const BLOOD_PRESSURE: Bounds = Bounds::closed(1, 3).with_default(1);
    pub const SLEEP_QUALITY: Bounds = Bounds::closed(0, 5);
    pub const BREATHING_PROBLEM: Bounds = Bounds::closed(0, 5);
    pub const NOISE_LEVEL: Bounds = Bounds::closed(0, 5);
    pub const SOCIAL_SUPPORT: Bounds = Bounds::closed(0, 3);
    pub const EXTRACURRICULAR_ACTIVITIES: Bounds = Bounds::closed(0, 5);

    /// Every score field with its bounds, in feature order
    pub const FIELDS: [(&'static str, Bounds); 10] = [
        ("anxiety", Self::ANXIETY),
        ("self_esteem", Self::SELF_ESTEEM),
        ("depression", Self::DEPRESSION),
        ("headache", Self::HEADACHE),
        ("blood_pressure", Self::BLOOD_PRESSURE),
        ("sleep_quality", Self::SLEEP_QUALITY),
        ("breathing_problem", Self::BREATHING_PROBLEM),
        ("noise_level", Self::NOISE_LEVEL),
        ("social_support", Self::SOCIAL_SUPPORT),
        ("extracurricular_activities", Self::EXTRACURRICULAR_ACTIVITIES),
    ];
}

impl Validate for SurveyScores {
    fn read(fields: &mut PayloadReader<'_>) -> Self {
        Self {
            anxiety: fields.bounded_int("anxiety", Self::ANXIETY),
            self_esteem: fields.bounded_int("self_esteem", Self::SELF_ESTEEM),
            depression: fields.bounded_int("depression", Self::DEPRESSION),
            headache: fields.bounded_int("headache", Self::HEADACHE),
            blood_pressure: fields.bounded_int("blood_pressure", Self::BLOOD_PRESSURE),
            sleep_quality: fields.bounded_int("sleep_quality", Self::SLEEP_QUALITY),
            breathing_problem: fields.bounded_int("breathing_problem", Self::BREATHING_PROBLEM),
            noise_level: fields.bounded_int("noise_level", Self::NOISE_LEVEL),
            social_support: fields.bounded_int("social_support", Self::SOCIAL_SUPPORT),
            extracurricular_activities: fields
                .bounded_int("extracurricular_activities", Self::EXTRACURRICULAR_ACTIVITIES),
        }
    }
}

/// A full survey submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerWithFeatures {
    #[serde(flatten)]
    pub worker: WorkerWithHistory,
    #[serde(with = "info_date_format")]
    pub info_date: NaiveDateTime,
    #[serde(flatten)]
    pub scores: SurveyScores,
}

impl WorkerWithFeatures {
    pub fn identity(&self) -> &WorkerIdentity {
        &self.worker.identity
    }

    pub fn history(&self) -> &WorkerWithHistory {
        &self.worker
    }

    pub fn scores(&self) -> &SurveyScores {
        &self.scores
    }
}

impl Validate for WorkerWithFeatures {
    fn read(fields: &mut PayloadReader<'_>) -> Self {
        Self {
            worker: WorkerWithHistory::read(fields),
            info_date: fields.parsed("info_date", "value_error.datetime", parse_info_date),
            scores: SurveyScores::read(fields),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};
    use serde_json::{json, Value};

    fn sample_payload() -> Value {
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

    fn with_field(field: &str, value: Value) -> Value {
        let mut payload = sample_payload();
        payload[field] = value;
        payload
    }

    fn without_field(field: &str) -> Value {
        let mut payload = sample_payload();
        payload.as_object_mut().unwrap().remove(field);
        payload
    }

    #[test]
    fn test_valid_payload_accepted() {
        let worker = WorkerWithFeatures::validate(&sample_payload()).unwrap();
        assert_eq!(worker.identity(), &WorkerIdentity::new("Ivan", "Petrov", "Sergeevich"));
        assert!(!worker.history().mental_health_history);
        assert_eq!(worker.scores.anxiety, 10);
        assert_eq!(worker.scores.extracurricular_activities, 3);
    }

    #[test]
    fn test_every_bound_is_inclusive() {
        for (field, bounds) in SurveyScores::FIELDS {
            for accepted in [bounds.min, bounds.max] {
                let worker = WorkerWithFeatures::validate(&with_field(field, json!(accepted)))
                    .unwrap_or_else(|e| panic!("{} = {} rejected: {}", field, accepted, e));
                let got = crate::FeatureVector::from(worker.scores())
                    .iter_named()
                    .find(|(name, _)| *name == field)
                    .map(|(_, v)| v);
                assert_eq!(got, Some(accepted));
            }

            for rejected in [i64::from(bounds.min) - 1, i64::from(bounds.max) + 1] {
                let errors = WorkerWithFeatures::validate(&with_field(field, json!(rejected)))
                    .expect_err(&format!("{} = {} accepted", field, rejected));
                assert_eq!(errors.fields(), vec![field]);
            }
        }
    }

    #[test]
    fn test_blood_pressure_defaults_to_one() {
        let worker = WorkerWithFeatures::validate(&without_field("blood_pressure")).unwrap();
        assert_eq!(worker.scores.blood_pressure, 1);
    }

    #[test]
    fn test_other_scores_are_required() {
        for (field, _) in SurveyScores::FIELDS {
            if field == "blood_pressure" {
                continue;
            }
            let errors = WorkerWithFeatures::validate(&without_field(field)).unwrap_err();
            assert_eq!(errors.fields(), vec![field]);
            assert_eq!(errors.errors()[0].kind, "value_error.missing");
        }
    }

    #[test]
    fn test_non_integer_scores_rejected() {
        for bad in [json!(2.5), json!("3"), json!(true), json!([1])] {
            let errors = WorkerWithFeatures::validate(&with_field("headache", bad)).unwrap_err();
            assert_eq!(errors.errors()[0].kind, "type_error.integer");
        }
    }

    #[test]
    fn test_info_date_parses_exact_instant() {
        let parsed = parse_info_date("2024-01-15 10:30:00").unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        assert_eq!(parsed, expected);
        assert_eq!(parsed.second(), 0);
    }

    #[test]
    fn test_info_date_rejects_other_shapes() {
        for bad in [
            "2024-01-15",
            "2024-01-15T10:30:00",
            "2024/01/15 10:30:00",
            "2024-01-15  10:30:00",
            "2024-01-15 10:30",
            "2024-13-15 10:30:00",
            "2024-01-15 25:30:00",
            "yesterday",
            "",
            "2024- 1-15 10:30:00",
            "2024-01- 5 10:30:00",
            "2024-01-15  1:30:00",
            "2024-01-15 10: 3:00",
            "2024-01-15 10:30: 0",
            "+024-01-15 10:30:00",
            "2024-01-15 10:30:60",
        ] {
            assert!(parse_info_date(bad).is_err(), "{:?} accepted", bad);
        }

        let errors = WorkerWithFeatures::validate(&with_field("info_date", json!("2024-01-15")))
            .unwrap_err();
        assert_eq!(errors.fields(), vec!["info_date"]);
        assert_eq!(errors.errors()[0].kind, "value_error.datetime");
    }

    #[test]
    fn test_errors_are_aggregated() {
        let payload = json!({
            "first_name": "",
            "last_name": "Petrov",
            "mental_health_history": "no",
            "info_date": "2024-01-15",
            "anxiety": 22,
            "self_esteem": 20,
            "depression": 5,
            "headache": 2,
            "sleep_quality": 3,
            "breathing_problem": 1,
            "noise_level": 2,
            "social_support": 4,
            "extracurricular_activities": 3
        });

        let errors = WorkerWithFeatures::validate(&payload).unwrap_err();
        assert_eq!(
            errors.fields(),
            vec![
                "first_name",
                "surname",
                "mental_health_history",
                "info_date",
                "anxiety",
                "social_support"
            ]
        );
    }

    #[test]
    fn test_identity_projection_and_prediction() {
        let worker = WorkerWithFeatures::validate(&sample_payload()).unwrap();
        let predicted = worker.identity().clone().with_prediction("low stress level");

        let body = serde_json::to_value(&predicted).unwrap();
        assert_eq!(
            body,
            json!({
                "first_name": "Ivan",
                "last_name": "Petrov",
                "surname": "Sergeevich",
                "stress_level": "low stress level"
            })
        );
    }

    #[test]
    fn test_features_serialize_flat_with_wire_date() {
        let worker = WorkerWithFeatures::validate(&sample_payload()).unwrap();
        assert_eq!(serde_json::to_value(&worker).unwrap(), sample_payload());

        let back: WorkerWithFeatures = serde_json::from_value(sample_payload()).unwrap();
        assert_eq!(back, worker);
    }

    #[test]
    fn test_history_requires_boolean() {
        let payload = json!({
            "first_name": "Anna",
            "last_name": "Ivanova",
            "surname": "Olegovna",
            "mental_health_history": 1
        });
        let errors = WorkerWithHistory::validate(&payload).unwrap_err();
        assert_eq!(errors.fields(), vec!["mental_health_history"]);

        let ok = WorkerWithHistory::validate(&with_field_history(true)).unwrap();
        assert!(ok.mental_health_history);
        assert_eq!(ok.identity.to_string(), "Anna Ivanova Olegovna");
    }

    fn with_field_history(flag: bool) -> Value {
        json!({
            "first_name": "Anna",
            "last_name": "Ivanova",
            "surname": "Olegovna",
            "mental_health_history": flag
        })
    }
}
