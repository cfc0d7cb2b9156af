//! Versioned model artifacts
//!
//! A trained model, its encoding table, scaler, and imputation statistics
//! persist together as one JSON blob. Both a format version and the schema
//! version are checked on load; an incompatible or corrupt blob is an
//! artifact error, never a silently served model.

use crate::schema::SCHEMA_VERSION;
use crate::train::TrainedModel;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Artifact blob layout version
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// A persisted, versioned model bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    /// Blob layout version
    pub format_version: u32,
    /// Schema the model was trained against
    pub schema_version: u32,
    /// When the artifact was written
    pub created_at: DateTime<Utc>,
    /// The trained model and its preprocessing metadata
    pub model: TrainedModel,
}

impl Artifact {
    /// Wrap a trained model with the current version tags
    pub fn new(model: TrainedModel) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            schema_version: SCHEMA_VERSION,
            created_at: Utc::now(),
            model,
        }
    }

    /// Write the artifact as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Serialization(format!("artifact serialization failed: {e}")))?;
        let mut file = File::create(path.as_ref())?;
        file.write_all(data.as_bytes())?;
        Ok(())
    }

    /// Load and version-check an artifact
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Artifact(format!("cannot read artifact '{}': {e}", path.display()))
        })?;
        let artifact: Self = serde_json::from_str(&text).map_err(|e| {
            Error::Artifact(format!("artifact '{}' is corrupt: {e}", path.display()))
        })?;
        if artifact.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(Error::Artifact(format!(
                "artifact format version {} is incompatible (expected {})",
                artifact.format_version, ARTIFACT_FORMAT_VERSION
            )));
        }
        if artifact.schema_version != SCHEMA_VERSION {
            return Err(Error::Artifact(format!(
                "artifact schema version {} is incompatible (expected {})",
                artifact.schema_version, SCHEMA_VERSION
            )));
        }
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Algorithm, Classifier};
    use crate::preprocess::{EncodingTable, ImputeStats};
    use crate::split::ScalerParameters;
    use crate::train::Trainer;
    use ndarray::Array2;
    use tempfile::NamedTempFile;

    fn trained_model() -> TrainedModel {
        let mut rows = Vec::new();
        let mut y = Vec::new();
        for i in 0..10 {
            rows.extend([i as f64 * 0.1]);
            y.push(0u8);
            rows.extend([4.0 + i as f64 * 0.1]);
            y.push(1u8);
        }
        let x = Array2::from_shape_vec((20, 1), rows).unwrap();
        let trainer = Trainer {
            encoding: EncodingTable::from_schema(),
            scaler: ScalerParameters {
                mean: vec![2.0],
                std: vec![1.5],
            },
            impute: ImputeStats { bmi_median: 28.1 },
        };
        trainer.train(Algorithm::DecisionTree, &x, &y).unwrap()
    }

    #[test]
    fn test_save_load_round_trip_predictions_identical() {
        let model = trained_model();
        let file = NamedTempFile::new().unwrap();
        Artifact::new(model.clone()).save(file.path()).unwrap();

        let loaded = Artifact::load(file.path()).unwrap();
        assert_eq!(loaded.format_version, ARTIFACT_FORMAT_VERSION);
        assert_eq!(loaded.schema_version, SCHEMA_VERSION);
        for row in [[0.5], [2.0], [4.5]] {
            assert_eq!(
                model.model.predict_proba_row(&row).unwrap(),
                loaded.model.model.predict_proba_row(&row).unwrap()
            );
        }
        assert_eq!(model.impute, loaded.model.impute);
        assert_eq!(model.scaler, loaded.model.scaler);
    }

    #[test]
    fn test_missing_artifact_is_artifact_error() {
        let err = Artifact::load("/nonexistent/model.json").unwrap_err();
        assert!(matches!(err, Error::Artifact(_)));
    }

    #[test]
    fn test_corrupt_artifact_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        let err = Artifact::load(file.path()).unwrap_err();
        assert!(matches!(err, Error::Artifact(_)));
    }

    #[test]
    fn test_tampered_format_version_rejected() {
        let file = NamedTempFile::new().unwrap();
        Artifact::new(trained_model()).save(file.path()).unwrap();

        let mut value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(file.path()).unwrap()).unwrap();
        value["format_version"] = serde_json::json!(99);
        std::fs::write(file.path(), serde_json::to_string(&value).unwrap()).unwrap();

        let err = Artifact::load(file.path()).unwrap_err();
        assert!(matches!(err, Error::Artifact(_)));
        assert!(format!("{err}").contains("format version"));
    }

    #[test]
    fn test_tampered_schema_version_rejected() {
        let file = NamedTempFile::new().unwrap();
        Artifact::new(trained_model()).save(file.path()).unwrap();

        let mut value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(file.path()).unwrap()).unwrap();
        value["schema_version"] = serde_json::json!(0);
        std::fs::write(file.path(), serde_json::to_string(&value).unwrap()).unwrap();

        let err = Artifact::load(file.path()).unwrap_err();
        assert!(format!("{err}").contains("schema version"));
    }

    #[test]
    fn test_save_to_invalid_path_fails() {
        let artifact = Artifact::new(trained_model());
        assert!(artifact.save("/nonexistent/dir/model.json").is_err());
    }
}
