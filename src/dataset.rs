//! Tabular dataset loading
//!
//! Reads the 12-column training file into [`RawRecord`]s, validating each
//! row against the declared schema as it is read. Loading is a blocking,
//! one-shot operation; a failure here is fatal to the run.

use crate::schema::RawRecord;
use crate::{Error, Result};
use std::path::Path;

/// An ordered collection of raw training records
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Rows in input order
    pub records: Vec<RawRecord>,
}

impl Dataset {
    /// Load a dataset from a CSV file with the training header
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = csv::Reader::from_path(path).map_err(|e| {
            Error::Schema(format!("failed to open '{}': {e}", path.display()))
        })?;
        Self::from_csv_reader(reader)
    }

    /// Load a dataset from any CSV reader (used by tests)
    pub fn from_csv_reader<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let mut records = Vec::new();
        for (i, row) in reader.deserialize::<RawRecord>().enumerate() {
            let record = row.map_err(|e| {
                // Row numbers are 1-based and skip the header line
                Error::Schema(format!("row {}: {e}", i + 2))
            })?;
            record.to_inference().validate().map_err(|e| match e {
                Error::Schema(msg) => Error::Schema(format!("row {}: {msg}", i + 2)),
                other => other,
            })?;
            records.push(record);
        }
        if records.is_empty() {
            return Err(Error::Schema("dataset contains no rows".to_string()));
        }
        Ok(Self { records })
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Extract the 0/1 labels, failing if any row lacks one
    pub fn labels(&self) -> Result<Vec<u8>> {
        self.records.iter().map(RawRecord::label).collect()
    }

    /// Count of (negative, positive) labels
    pub fn class_counts(&self) -> Result<(usize, usize)> {
        let labels = self.labels()?;
        let pos = labels.iter().filter(|&&y| y == 1).count();
        Ok((labels.len() - pos, pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "id,gender,age,hypertension,heart_disease,ever_married,work_type,residence_type,avg_glucose_level,bmi,smoking_status,stroke";

    fn load(body: &str) -> Result<Dataset> {
        let data = format!("{HEADER}\n{body}");
        Dataset::from_csv_reader(csv::Reader::from_reader(data.as_bytes()))
    }

    #[test]
    fn test_load_valid_rows() {
        let ds = load(
            "1,Male,67,0,1,Yes,Private,Urban,228.69,36.6,formerly smoked,1\n\
             2,Female,61,0,0,Yes,Self-employed,Rural,202.21,N/A,never smoked,0\n",
        )
        .unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.labels().unwrap(), vec![1, 0]);
        assert!(ds.records[1].bmi.is_none());
    }

    #[test]
    fn test_class_counts() {
        let ds = load(
            "1,Male,67,0,1,Yes,Private,Urban,228.69,36.6,formerly smoked,1\n\
             2,Female,61,0,0,Yes,Self-employed,Rural,202.21,28.1,never smoked,0\n\
             3,Male,80,0,1,Yes,Private,Rural,105.92,32.5,never smoked,0\n",
        )
        .unwrap();
        assert_eq!(ds.class_counts().unwrap(), (2, 1));
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let err = load("").unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn test_malformed_row_reports_row_number() {
        let err = load(
            "1,Male,67,0,1,Yes,Private,Urban,228.69,36.6,formerly smoked,1\n\
             2,Female,not-a-number,0,0,Yes,Private,Urban,100.0,25.0,never smoked,0\n",
        )
        .unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("row 3"), "got: {msg}");
    }

    #[test]
    fn test_out_of_range_field_rejected() {
        let err = load("1,Male,-4,0,1,Yes,Private,Urban,228.69,36.6,formerly smoked,1\n")
            .unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = Dataset::from_csv_path("/nonexistent/stroke.csv").unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }
}
