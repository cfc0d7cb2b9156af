//! Prevenir: stroke risk scoring pipeline
//!
//! Trains, evaluates, and serves binary stroke-risk classifiers over the
//! tabular patient schema. The pipeline is one sequential batch:
//!
//! 1. [`dataset`] loads raw CSV records against the fixed [`schema`]
//! 2. [`preprocess`] encodes categoricals and imputes missing BMI
//! 3. [`split`] produces a seeded train/test partition and the scaler
//! 4. [`resample`] balances the training partition with SMOTE
//! 5. [`train`] fits one of the [`model`] algorithms
//! 6. [`eval`] scores the held-out partition (metrics plus curves)
//! 7. [`artifact`] persists the versioned model bundle
//! 8. [`predict`] serves single-record risk scores from a loaded bundle
//!
//! [`pipeline`] wires steps 1-6 together; the [`cli`] drives everything
//! from the command line.

pub mod artifact;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod eval;
pub mod model;
pub mod pipeline;
pub mod predict;
pub mod preprocess;
pub mod resample;
pub mod schema;
pub mod split;
pub mod train;

pub use artifact::{Artifact, ARTIFACT_FORMAT_VERSION};
pub use config::PipelineConfig;
pub use dataset::Dataset;
pub use error::{Error, Result};
pub use eval::{evaluate, EvaluationResult};
pub use model::{Algorithm, Classifier, ClassifierModel};
pub use predict::{PredictionResult, PredictionService, RiskBand};
pub use schema::{InferenceRecord, RawRecord, SCHEMA_VERSION};
pub use train::{TrainedModel, Trainer};
