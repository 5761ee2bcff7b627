//! Clinical feature contract
//!
//! Every component that touches patient data agrees on the same ordered list
//! of 13 numeric features. Raw input (web JSON, terminal form, CSV rows) is
//! coerced into a [`FeatureVector`] here, and nowhere else:
//! - all 13 named fields must be present
//! - every value must parse to a finite `f64`
//! - no range checks are applied (`sex` outside {0, 1} is accepted)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Number of features every vector carries
pub const N_FEATURES: usize = 13;

/// Feature names in the order used for scaling and classification
pub const FEATURE_NAMES: [&str; N_FEATURES] = [
    "age", "sex", "cp", "trestbps", "chol", "fbs", "restecg", "thalach", "exang", "oldpeak",
    "slope", "ca", "thal",
];

/// Example patient used to pre-fill the prediction forms
pub const EXAMPLE_RECORD: [f64; N_FEATURES] =
    [63.0, 1.0, 1.0, 145.0, 233.0, 1.0, 2.0, 150.0, 0.0, 2.3, 3.0, 0.0, 6.0];

/// Why a raw record was rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("invalid value for `{field}`: {value}")]
    InvalidValue { field: &'static str, value: String },
}

/// A single raw input value as it arrives from a front-end.
///
/// Deserialization never fails: anything that is neither a number nor a
/// string lands in `Other` and is rejected during validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl RawValue {
    fn coerce(&self, field: &'static str) -> Result<f64, ValidationError> {
        let invalid = |value: String| ValidationError::InvalidValue { field, value };

        let parsed = match self {
            RawValue::Number(v) => *v,
            RawValue::Text(s) => s.trim().parse::<f64>().map_err(|_| invalid(s.clone()))?,
            RawValue::Other(v) => return Err(invalid(v.to_string())),
        };

        if parsed.is_finite() {
            Ok(parsed)
        } else {
            Err(invalid(parsed.to_string()))
        }
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Number(v)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

/// Raw record keyed by feature name
pub type RawRecord = HashMap<String, RawValue>;

/// Ordered, validated feature values for one patient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f64; N_FEATURES]);

impl FeatureVector {
    /// Wrap values that are already in contract order
    pub fn new(values: [f64; N_FEATURES]) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64; N_FEATURES] {
        &self.0
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Look up a value by feature name
    pub fn get(&self, name: &str) -> Option<f64> {
        feature_index(name).map(|i| self.0[i])
    }

    /// Render back into a raw record, e.g. to pre-fill a form
    pub fn to_raw(&self) -> RawRecord {
        FEATURE_NAMES
            .iter()
            .zip(self.0.iter())
            .map(|(name, &v)| (name.to_string(), RawValue::Number(v)))
            .collect()
    }
}

impl TryFrom<&[f64]> for FeatureVector {
    type Error = crate::error::HeartwiseError;

    fn try_from(values: &[f64]) -> crate::error::Result<Self> {
        let arr: [f64; N_FEATURES] =
            values
                .try_into()
                .map_err(|_| crate::error::HeartwiseError::ShapeError {
                    expected: format!("{} features", N_FEATURES),
                    actual: format!("{} features", values.len()),
                })?;
        Ok(Self(arr))
    }
}

/// Position of a feature in the contract order
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_NAMES.iter().position(|f| *f == name)
}

/// The example record as a feature vector
pub fn example_vector() -> FeatureVector {
    FeatureVector(EXAMPLE_RECORD)
}

/// Validate a raw record into a [`FeatureVector`].
///
/// Fields are checked in contract order and the first failure wins. Extra
/// keys are ignored.
pub fn validate(raw: &RawRecord) -> Result<FeatureVector, ValidationError> {
    let mut values = [0.0; N_FEATURES];
    for (slot, &field) in values.iter_mut().zip(FEATURE_NAMES.iter()) {
        let value = raw.get(field).ok_or(ValidationError::MissingField(field))?;
        *slot = value.coerce(field)?;
    }
    Ok(FeatureVector(values))
}
