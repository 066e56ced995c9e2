//! Field-level validation of untyped JSON payloads
//!
//! Records are read field by field from a JSON object through a
//! [`PayloadReader`]. Every field is checked and every failure is collected,
//! so a client sees all problems of a payload in one response instead of
//! fixing them one at a time.
//!
//! Error locations and type codes follow the `{"loc", "msg", "type"}` shape
//! existing clients of the service already parse.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Location of the offending value, e.g. `["body", "anxiety"]`
    pub loc: Vec<String>,
    /// Human-readable constraint description
    pub msg: String,
    /// Machine-readable error code
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    /// Error attached to a named field of the request body
    pub fn new(field: &str, msg: impl Into<String>, kind: &str) -> Self {
        Self {
            loc: vec!["body".to_string(), field.to_string()],
            msg: msg.into(),
            kind: kind.to_string(),
        }
    }

    /// Error attached to the request body as a whole
    pub fn body(msg: impl Into<String>, kind: &str) -> Self {
        Self {
            loc: vec!["body".to_string()],
            msg: msg.into(),
            kind: kind.to_string(),
        }
    }

    /// Field name, if the error is attached to a field
    pub fn field(&self) -> Option<&str> {
        self.loc.get(1).map(String::as_str)
    }
}

/// All field errors found in one payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Error)]
#[serde(transparent)]
#[error("{} validation error(s): {}", .errors.len(), summarize(.errors))]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.loc.join("."), e.msg))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Names of all rejected fields, in the order they were checked
    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().filter_map(FieldError::field).collect()
    }
}

impl From<FieldError> for ValidationErrors {
    fn from(error: FieldError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

/// Closed integer interval with an optional default for absent values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min: u8,
    pub max: u8,
    pub default: Option<u8>,
}

impl Bounds {
    /// Required field constrained to `min..=max`
    pub const fn closed(min: u8, max: u8) -> Self {
        Self {
            min,
            max,
            default: None,
        }
    }

    /// Same interval, but absent values take `default`
    pub const fn with_default(self, default: u8) -> Self {
        Self {
            default: Some(default),
            ..self
        }
    }

    pub fn contains(&self, value: i64) -> bool {
        (i64::from(self.min)..=i64::from(self.max)).contains(&value)
    }
}

/// Reads typed fields out of a JSON object, collecting every failure
///
/// Accessors always return a value so records can be assembled
/// unconditionally; when a field is rejected the returned value is a
/// placeholder and [`PayloadReader::finish`] discards the record.
pub struct PayloadReader<'a> {
    object: &'a Map<String, Value>,
    errors: Vec<FieldError>,
}

impl<'a> PayloadReader<'a> {
    pub fn new(object: &'a Map<String, Value>) -> Self {
        Self {
            object,
            errors: Vec::new(),
        }
    }

    /// `null` counts as absent
    fn present(&self, field: &str) -> Option<&'a Value> {
        self.object.get(field).filter(|value| !value.is_null())
    }

    fn reject(&mut self, field: &str, msg: impl Into<String>, kind: &str) {
        self.errors.push(FieldError::new(field, msg, kind));
    }

    fn missing(&mut self, field: &str) {
        self.reject(field, "field required", "value_error.missing");
    }

    /// Required string, non-empty after trimming
    pub fn required_str(&mut self, field: &str) -> String {
        match self.present(field) {
            None => {
                self.missing(field);
                String::new()
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                self.reject(
                    field,
                    "ensure this value has at least 1 non-whitespace character",
                    "value_error.any_str.min_length",
                );
                String::new()
            }
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                self.reject(field, "str type expected", "type_error.str");
                String::new()
            }
        }
    }

    /// Required JSON boolean
    pub fn required_bool(&mut self, field: &str) -> bool {
        match self.present(field) {
            None => {
                self.missing(field);
                false
            }
            Some(Value::Bool(b)) => *b,
            Some(_) => {
                self.reject(field, "value could not be parsed to a boolean", "type_error.bool");
                false
            }
        }
    }

    /// Integral JSON number inside `bounds`
    pub fn bounded_int(&mut self, field: &str, bounds: Bounds) -> u8 {
        let value = match self.present(field) {
            None => {
                return match bounds.default {
                    Some(default) => default,
                    None => {
                        self.missing(field);
                        bounds.min
                    }
                };
            }
            Some(value) => value,
        };

        let number = match value {
            Value::Number(n) if n.is_i64() || n.is_u64() => n.as_i64().unwrap_or(i64::MAX),
            _ => {
                self.reject(field, "value is not a valid integer", "type_error.integer");
                return bounds.min;
            }
        };

        if !bounds.contains(number) {
            if number < i64::from(bounds.min) {
                self.reject(
                    field,
                    format!("ensure this value is greater than or equal to {}", bounds.min),
                    "value_error.number.not_ge",
                );
            } else {
                self.reject(
                    field,
                    format!("ensure this value is less than or equal to {}", bounds.max),
                    "value_error.number.not_le",
                );
            }
            return bounds.min;
        }

        // In range, so it fits in u8
        number as u8
    }

    /// Required string converted by `parse`; a parse failure is reported with `kind`
    pub fn parsed<T, F>(&mut self, field: &str, kind: &str, parse: F) -> T
    where
        T: Default,
        F: FnOnce(&str) -> std::result::Result<T, String>,
    {
        match self.present(field) {
            None => {
                self.missing(field);
                T::default()
            }
            Some(Value::String(s)) => match parse(s) {
                Ok(value) => value,
                Err(msg) => {
                    self.reject(field, msg, kind);
                    T::default()
                }
            },
            Some(_) => {
                self.reject(field, "str type expected", "type_error.str");
                T::default()
            }
        }
    }

    /// Accept `record` only if no field was rejected
    pub fn finish<T>(self, record: T) -> std::result::Result<T, ValidationErrors> {
        if self.errors.is_empty() {
            Ok(record)
        } else {
            Err(ValidationErrors {
                errors: self.errors,
            })
        }
    }
}

/// A record shape that can be read from an untyped JSON payload
pub trait Validate: Sized {
    /// Read this shape's fields; failures are recorded in `fields`
    fn read(fields: &mut PayloadReader<'_>) -> Self;

    /// Validate a whole request body
    fn validate(payload: &Value) -> std::result::Result<Self, ValidationErrors> {
        let object = payload.as_object().ok_or_else(|| {
            ValidationErrors::from(FieldError::body("value is not a valid dict", "type_error.dict"))
        })?;
        let mut fields = PayloadReader::new(object);
        let record = Self::read(&mut fields);
        fields.finish(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_required_str_rejects_blank_and_non_string() {
        let obj = object(json!({"a": "  ", "b": 5, "c": "ok"}));
        let mut fields = PayloadReader::new(&obj);
        assert_eq!(fields.required_str("a"), "");
        assert_eq!(fields.required_str("b"), "");
        assert_eq!(fields.required_str("c"), "ok");
        assert_eq!(fields.required_str("d"), "");

        let errors = fields.finish(()).unwrap_err();
        assert_eq!(errors.fields(), vec!["a", "b", "d"]);
        assert_eq!(errors.errors()[0].kind, "value_error.any_str.min_length");
        assert_eq!(errors.errors()[1].kind, "type_error.str");
        assert_eq!(errors.errors()[2].kind, "value_error.missing");
    }

    #[test]
    fn test_bounded_int_reports_bound_in_message() {
        let obj = object(json!({"low": -1, "high": 6}));
        let mut fields = PayloadReader::new(&obj);
        fields.bounded_int("low", Bounds::closed(0, 5));
        fields.bounded_int("high", Bounds::closed(0, 5));

        let errors = fields.finish(()).unwrap_err();
        assert_eq!(errors.errors()[0].kind, "value_error.number.not_ge");
        assert!(errors.errors()[0].msg.ends_with("0"));
        assert_eq!(errors.errors()[1].kind, "value_error.number.not_le");
        assert!(errors.errors()[1].msg.ends_with("5"));
    }

    #[test]
    fn test_bounded_int_rejects_huge_and_fractional_numbers() {
        let obj = object(json!({"huge": u64::MAX, "frac": 2.5, "text": "3", "flag": true}));
        let mut fields = PayloadReader::new(&obj);
        for field in ["huge", "frac", "text", "flag"] {
            fields.bounded_int(field, Bounds::closed(0, 5));
        }

        let errors = fields.finish(()).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors.errors()[0].kind, "value_error.number.not_le");
        assert!(errors.errors()[1..].iter().all(|e| e.kind == "type_error.integer"));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let bounds = Bounds::closed(1, 3);
        assert!(!bounds.contains(0));
        assert!(bounds.contains(1));
        assert!(bounds.contains(3));
        assert!(!bounds.contains(4));
        assert!(!bounds.contains(-1));

        let obj = object(json!({"lo": 1, "hi": 3}));
        let mut fields = PayloadReader::new(&obj);
        assert_eq!(fields.bounded_int("lo", bounds), 1);
        assert_eq!(fields.bounded_int("hi", bounds), 3);
        assert!(fields.finish(()).is_ok());
    }

    #[test]
    fn test_null_is_treated_as_absent() {
        let obj = object(json!({"x": null}));
        let mut fields = PayloadReader::new(&obj);
        assert_eq!(fields.bounded_int("x", Bounds::closed(1, 3).with_default(1)), 1);
        assert!(fields.finish(()).is_ok());
    }

    #[test]
    fn test_non_object_body_rejected() {
        struct Nothing;
        impl Validate for Nothing {
            fn read(_fields: &mut PayloadReader<'_>) -> Self {
                Nothing
            }
        }

        let errors = Nothing::validate(&json!([1, 2, 3])).err().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors()[0].loc, vec!["body".to_string()]);
        assert_eq!(errors.errors()[0].kind, "type_error.dict");
    }

    #[test]
    fn test_display_lists_every_field() {
        let obj = object(json!({}));
        let mut fields = PayloadReader::new(&obj);
        fields.required_str("first_name");
        fields.required_bool("flag");
        let errors = fields.finish(()).unwrap_err();

        let text = errors.to_string();
        assert!(text.starts_with("2 validation error(s)"));
        assert!(text.contains("body.first_name: field required"));
        assert!(text.contains("body.flag: field required"));
    }
}
