//! Training harness
//!
//! Fits one algorithm on a prepared training partition and bundles the
//! fitted model with the preprocessing metadata (encoding table, scaler,
//! imputation statistics) required to reproduce its features at inference.
//! Wall-clock training duration is recorded for observability only; it is
//! not part of the model's identity.

use crate::model::{Algorithm, Classifier, ClassifierModel};
use crate::preprocess::{EncodingTable, ImputeStats};
use crate::split::ScalerParameters;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// A fitted model plus everything needed to run it on raw records.
///
/// Immutable after creation; persisted whole as a single artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    /// Which algorithm produced this model
    pub algorithm: Algorithm,
    /// The hyperparameter set, echoed for inspection
    pub hyperparameters: serde_json::Value,
    /// Fitted parameters
    pub model: ClassifierModel,
    /// Categorical encoding used to build the training features
    pub encoding: EncodingTable,
    /// Scaler fit on the training partition
    pub scaler: ScalerParameters,
    /// Imputation statistics fit at training time
    pub impute: ImputeStats,
    /// Whether the model was trained on scaled features (and therefore
    /// expects inference features to be scaled too)
    pub scaled_features: bool,
    /// When training finished
    pub trained_at: DateTime<Utc>,
    /// Wall-clock fit duration in milliseconds
    pub training_duration_ms: u64,
    /// Rows in the (resampled) training partition
    pub n_train_samples: usize,
}

/// Preprocessing state shared between training and the inference path
#[derive(Debug, Clone)]
pub struct Trainer {
    /// Encoding produced by the preprocessor
    pub encoding: EncodingTable,
    /// Scaler fit on the training partition
    pub scaler: ScalerParameters,
    /// Imputation statistics
    pub impute: ImputeStats,
}

impl Trainer {
    /// Fit `algorithm` with its default hyperparameters.
    ///
    /// `x_train` must already be scaled iff `algorithm.needs_scaling()`;
    /// the caller (the pipeline) owns that decision and it is recorded in
    /// the returned model.
    pub fn train(
        &self,
        algorithm: Algorithm,
        x_train: &Array2<f64>,
        y_train: &[u8],
    ) -> Result<TrainedModel> {
        self.train_model(algorithm, algorithm.default_model(), x_train, y_train)
    }

    /// Fit a pre-configured model (custom hyperparameters) as `algorithm`
    pub fn train_model(
        &self,
        algorithm: Algorithm,
        mut model: ClassifierModel,
        x_train: &Array2<f64>,
        y_train: &[u8],
    ) -> Result<TrainedModel> {
        if x_train.nrows() == 0 || y_train.is_empty() {
            return Err(Error::Training("training set is empty".to_string()));
        }

        let start = Instant::now();
        model.fit(x_train, y_train)?;
        let training_duration_ms = start.elapsed().as_millis() as u64;

        Ok(TrainedModel {
            algorithm,
            hyperparameters: model.hyperparameters(),
            model,
            encoding: self.encoding.clone(),
            scaler: self.scaler.clone(),
            impute: self.impute.clone(),
            scaled_features: algorithm.needs_scaling(),
            trained_at: Utc::now(),
            training_duration_ms,
            n_train_samples: y_train.len(),
        })
    }
}
