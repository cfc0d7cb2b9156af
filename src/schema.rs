//! Versioned record schema for the stroke dataset
//!
//! Declares every field's name and semantic type explicitly so that input
//! validation happens at load time instead of by runtime dtype inspection.
//! The categorical value enumerations below are fixed and ordered; encoding
//! tables are derived from them once at training time and reused verbatim
//! at inference.

use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// Schema version stamped into persisted artifacts. Bump on any change to
/// field names, categorical enumerations, or the feature-vector layout.
pub const SCHEMA_VERSION: u32 = 1;

/// Semantic type of a schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Continuous numeric value
    Numeric,
    /// String value drawn from a fixed enumeration
    Categorical,
    /// 0/1 flag
    Boolean,
    /// Row identifier, never a predictive feature
    Identifier,
    /// The 0/1 training label
    Label,
}

/// Declaration of a single schema field
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Column name as it appears in the input file
    pub name: &'static str,
    /// Semantic type
    pub kind: FieldKind,
}

/// The full input schema, in column order
pub const SCHEMA: &[FieldSpec] = &[
    FieldSpec { name: "id", kind: FieldKind::Identifier },
    FieldSpec { name: "gender", kind: FieldKind::Categorical },
    FieldSpec { name: "age", kind: FieldKind::Numeric },
    FieldSpec { name: "hypertension", kind: FieldKind::Boolean },
    FieldSpec { name: "heart_disease", kind: FieldKind::Boolean },
    FieldSpec { name: "ever_married", kind: FieldKind::Categorical },
    FieldSpec { name: "work_type", kind: FieldKind::Categorical },
    FieldSpec { name: "residence_type", kind: FieldKind::Categorical },
    FieldSpec { name: "avg_glucose_level", kind: FieldKind::Numeric },
    FieldSpec { name: "bmi", kind: FieldKind::Numeric },
    FieldSpec { name: "smoking_status", kind: FieldKind::Categorical },
    FieldSpec { name: "stroke", kind: FieldKind::Label },
];

/// Declared value enumeration for one categorical field.
///
/// The order is fixed by declaration (not alphabetic, not frequency-based);
/// a value's integer code is its index in this list.
#[derive(Debug, Clone, Copy)]
pub struct CategoricalSpec {
    /// Field name
    pub field: &'static str,
    /// Allowed values, in encoding order
    pub values: &'static [&'static str],
}

/// Categorical enumerations, in feature order
pub const CATEGORICAL_FIELDS: &[CategoricalSpec] = &[
    CategoricalSpec { field: "gender", values: &["Male", "Female"] },
    CategoricalSpec { field: "ever_married", values: &["No", "Yes"] },
    CategoricalSpec {
        field: "work_type",
        values: &["Private", "Self-employed", "Govt_job", "children", "Never_worked"],
    },
    CategoricalSpec { field: "residence_type", values: &["Urban", "Rural"] },
    CategoricalSpec {
        field: "smoking_status",
        values: &["never smoked", "formerly smoked", "smokes", "Unknown"],
    },
];

/// Names of the predictive features, in feature-vector order
pub const FEATURE_NAMES: &[&str] = &[
    "gender",
    "age",
    "hypertension",
    "heart_disease",
    "ever_married",
    "work_type",
    "residence_type",
    "avg_glucose_level",
    "bmi",
    "smoking_status",
];

/// Number of predictive features after encoding
pub const N_FEATURES: usize = FEATURE_NAMES.len();

/// Deserialize an `f64` that may be encoded as the string `"N/A"` or an
/// empty cell (the source dataset marks missing `bmi` this way).
fn deserialize_f64_or_missing<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum F64OrString {
        Num(f64),
        Str(String),
    }

    match Option::<F64OrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(F64OrString::Num(v)) => Ok(Some(v)),
        Some(F64OrString::Str(s)) => {
            let s = s.trim();
            if s.is_empty() || s.eq_ignore_ascii_case("n/a") {
                Ok(None)
            } else {
                s.parse::<f64>().map(Some).map_err(|_| {
                    serde::de::Error::custom(format!("expected a number or 'N/A', got '{s}'"))
                })
            }
        }
    }
}

/// One raw training row, as read from the input file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    /// Row identifier; carries no predictive signal and is dropped
    pub id: u64,
    pub gender: String,
    pub age: f64,
    pub hypertension: u8,
    pub heart_disease: u8,
    pub ever_married: String,
    pub work_type: String,
    pub residence_type: String,
    pub avg_glucose_level: f64,
    /// May be missing in the source data
    #[serde(deserialize_with = "deserialize_f64_or_missing")]
    pub bmi: Option<f64>,
    pub smoking_status: String,
    /// 0/1 label; present only in training data
    #[serde(default)]
    pub stroke: Option<u8>,
}

/// One inference-time record: the training fields minus `id` and `stroke`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceRecord {
    pub gender: String,
    pub age: f64,
    pub hypertension: u8,
    pub heart_disease: u8,
    pub ever_married: String,
    pub work_type: String,
    pub residence_type: String,
    pub avg_glucose_level: f64,
    #[serde(default, deserialize_with = "deserialize_f64_or_missing")]
    pub bmi: Option<f64>,
    pub smoking_status: String,
}

impl InferenceRecord {
    /// Validate numeric/boolean ranges. Categorical values are checked
    /// against the encoding table at encode time, not here.
    pub fn validate(&self) -> Result<()> {
        if !self.age.is_finite() || self.age < 0.0 {
            return Err(Error::Schema(format!(
                "field 'age' must be a non-negative number, got {}",
                self.age
            )));
        }
        if self.hypertension > 1 {
            return Err(Error::Schema(format!(
                "field 'hypertension' must be 0 or 1, got {}",
                self.hypertension
            )));
        }
        if self.heart_disease > 1 {
            return Err(Error::Schema(format!(
                "field 'heart_disease' must be 0 or 1, got {}",
                self.heart_disease
            )));
        }
        if !self.avg_glucose_level.is_finite() {
            return Err(Error::Schema(
                "field 'avg_glucose_level' must be a finite number".to_string(),
            ));
        }
        if let Some(bmi) = self.bmi {
            if !bmi.is_finite() || bmi <= 0.0 {
                return Err(Error::Schema(format!(
                    "field 'bmi' must be a positive number, got {bmi}"
                )));
            }
        }
        Ok(())
    }
}

impl RawRecord {
    /// Predictive fields of this row, with `id` and `stroke` dropped
    pub fn to_inference(&self) -> InferenceRecord {
        InferenceRecord {
            gender: self.gender.clone(),
            age: self.age,
            hypertension: self.hypertension,
            heart_disease: self.heart_disease,
            ever_married: self.ever_married.clone(),
            work_type: self.work_type.clone(),
            residence_type: self.residence_type.clone(),
            avg_glucose_level: self.avg_glucose_level,
            bmi: self.bmi,
            smoking_status: self.smoking_status.clone(),
        }
    }

    /// The 0/1 label, or `SchemaError` if absent or out of range
    pub fn label(&self) -> Result<u8> {
        match self.stroke {
            Some(v @ (0 | 1)) => Ok(v),
            Some(v) => Err(Error::Schema(format!(
                "field 'stroke' must be 0 or 1, got {v}"
            ))),
            None => Err(Error::Schema(
                "field 'stroke' is required in training data".to_string(),
            )),
        }
    }
}

/// Look up the declared enumeration for a categorical field
pub fn categorical_spec(field: &str) -> Option<&'static CategoricalSpec> {
    CATEGORICAL_FIELDS.iter().find(|spec| spec.field == field)
}
