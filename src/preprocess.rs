//! Preprocessing: categorical encoding, imputation, feature assembly
//!
//! The [`EncodingTable`] is built once at training time from the declared
//! categorical enumerations and reused verbatim at inference. The same
//! [`encode_features`] routine produces the feature vector on both paths,
//! which is what keeps training and inference consistent.

use crate::schema::{
    categorical_spec, InferenceRecord, CATEGORICAL_FIELDS, N_FEATURES,
};
use crate::{Dataset, Error, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Immutable categorical-to-integer mapping, one entry per categorical field.
///
/// A value's code is its index in the field's value list. A value absent
/// from the list has no code; encoding it is an error, never a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingTable {
    fields: Vec<FieldEncoding>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct FieldEncoding {
    field: String,
    values: Vec<String>,
}

impl EncodingTable {
    /// Build the table from the declared schema enumerations
    pub fn from_schema() -> Self {
        Self {
            fields: CATEGORICAL_FIELDS
                .iter()
                .map(|spec| FieldEncoding {
                    field: spec.field.to_string(),
                    values: spec.values.iter().map(|v| v.to_string()).collect(),
                })
                .collect(),
        }
    }

    /// Encode one categorical value to its integer code
    pub fn encode(&self, field: &str, value: &str) -> Result<f64> {
        let entry = self
            .fields
            .iter()
            .find(|f| f.field == field)
            .ok_or_else(|| Error::Schema(format!("'{field}' is not a categorical field")))?;
        entry
            .values
            .iter()
            .position(|v| v == value)
            .map(|code| code as f64)
            .ok_or_else(|| Error::UnknownCategory {
                field: field.to_string(),
                value: value.to_string(),
            })
    }

    /// Decode an integer code back to its string value
    pub fn decode(&self, field: &str, code: usize) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.field == field)
            .and_then(|f| f.values.get(code))
            .map(String::as_str)
    }

    /// Number of declared values for a field
    pub fn cardinality(&self, field: &str) -> Option<usize> {
        self.fields
            .iter()
            .find(|f| f.field == field)
            .map(|f| f.values.len())
    }
}

/// Imputation statistics fit at training time and replayed at inference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputeStats {
    /// Median of the observed `bmi` values
    pub bmi_median: f64,
}

/// A dataset after imputation and encoding: a dense numeric feature matrix
/// plus the 0/1 labels, sharing one [`EncodingTable`].
#[derive(Debug, Clone)]
pub struct EncodedDataset {
    /// Row-per-record feature matrix, columns in [`crate::schema::FEATURE_NAMES`] order
    pub features: Array2<f64>,
    /// 0/1 labels aligned with `features` rows
    pub labels: Vec<u8>,
}

impl EncodedDataset {
    /// Number of rows
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the dataset is empty
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Assemble the feature vector for one record.
///
/// Missing `bmi` is imputed with the training-time median. Categorical
/// values map through `table`; an unseen value surfaces as
/// [`Error::UnknownCategory`].
pub fn encode_features(
    record: &InferenceRecord,
    table: &EncodingTable,
    impute: &ImputeStats,
) -> Result<[f64; N_FEATURES]> {
    record.validate()?;
    Ok([
        table.encode("gender", &record.gender)?,
        record.age,
        f64::from(record.hypertension),
        f64::from(record.heart_disease),
        table.encode("ever_married", &record.ever_married)?,
        table.encode("work_type", &record.work_type)?,
        table.encode("residence_type", &record.residence_type)?,
        record.avg_glucose_level,
        record.bmi.unwrap_or(impute.bmi_median),
        table.encode("smoking_status", &record.smoking_status)?,
    ])
}

/// Fits encoding and imputation on a raw dataset and produces the encoded
/// feature matrix. The identifier column is dropped here.
pub struct Preprocessor;

impl Preprocessor {
    /// Encode a raw training dataset.
    ///
    /// The `bmi` median is computed over the entire input before any split,
    /// matching the observed behavior of the system this replaces. Rows with
    /// out-of-enumeration categorical values are schema errors at this
    /// stage; the unknown-category path is reserved for inference.
    pub fn fit_transform(dataset: &Dataset) -> Result<(EncodedDataset, EncodingTable, ImputeStats)> {
        let table = EncodingTable::from_schema();
        let impute = ImputeStats {
            bmi_median: bmi_median(dataset)?,
        };

        let labels = dataset.labels()?;
        let mut rows = Vec::with_capacity(dataset.len() * N_FEATURES);
        for (i, record) in dataset.records.iter().enumerate() {
            let features =
                encode_features(&record.to_inference(), &table, &impute).map_err(|e| match e {
                    Error::UnknownCategory { field, value } => Error::Schema(format!(
                        "row {}: value '{value}' is not in the declared enumeration for '{field}'",
                        i + 1
                    )),
                    other => other,
                })?;
            rows.extend_from_slice(&features);
        }

        let features = Array2::from_shape_vec((dataset.len(), N_FEATURES), rows)
            .map_err(|e| Error::Schema(format!("feature matrix shape error: {e}")))?;

        Ok((EncodedDataset { features, labels }, table, impute))
    }
}

fn bmi_median(dataset: &Dataset) -> Result<f64> {
    let mut observed: Vec<f64> = dataset.records.iter().filter_map(|r| r.bmi).collect();
    if observed.is_empty() {
        return Err(Error::Schema(
            "cannot impute 'bmi': no observed values in the dataset".to_string(),
        ));
    }
    observed.sort_by(|a, b| a.total_cmp(b));
    let mid = observed.len() / 2;
    if observed.len() % 2 == 1 {
        Ok(observed[mid])
    } else {
        Ok((observed[mid - 1] + observed[mid]) / 2.0)
    }
}
