//! Single-record prediction service
//!
//! Loads a persisted artifact and scores raw records through exactly the
//! preprocessing the model was trained with: same encoding table, same
//! imputation median, same scaler. Each call is a pure function of the
//! record and the loaded model state, so calls may run concurrently.

use crate::artifact::Artifact;
use crate::config::{DEFAULT_BAND_CUTS, DEFAULT_THRESHOLD};
use crate::model::Classifier;
use crate::preprocess::encode_features;
use crate::schema::InferenceRecord;
use crate::train::TrainedModel;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Discretized probability bucket for user-facing communication
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    Low,
    Moderate,
    Elevated,
    High,
}

impl RiskBand {
    /// Map a probability to its band. Bands are lower-inclusive and
    /// upper-exclusive; the top band is closed at 1.0.
    pub fn from_probability(probability: f64, cuts: [f64; 3]) -> Self {
        if probability < cuts[0] {
            RiskBand::Low
        } else if probability < cuts[1] {
            RiskBand::Moderate
        } else if probability < cuts[2] {
            RiskBand::Elevated
        } else {
            RiskBand::High
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RiskBand::Low => "low",
            RiskBand::Moderate => "moderate",
            RiskBand::Elevated => "elevated",
            RiskBand::High => "high",
        };
        write!(f, "{name}")
    }
}

/// Outcome of one inference call. Created fresh per call, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Hard 0/1 label at the service's decision threshold
    pub label: u8,
    /// Stroke probability in [0, 1]
    pub probability: f64,
    /// Discretized risk band
    pub band: RiskBand,
}

/// Stateless scoring service over one loaded model
#[derive(Debug, Clone)]
pub struct PredictionService {
    model: TrainedModel,
    threshold: f64,
    band_cuts: [f64; 3],
}

impl PredictionService {
    /// Load a persisted artifact. A missing, corrupt, or incompatible
    /// artifact fails here, before any request is served.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_model(Artifact::load(path)?.model))
    }

    /// Serve an in-memory trained model
    pub fn from_model(model: TrainedModel) -> Self {
        Self {
            model,
            threshold: DEFAULT_THRESHOLD,
            band_cuts: DEFAULT_BAND_CUTS,
        }
    }

    /// Override the decision threshold
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Override the risk-band boundaries
    pub fn with_band_cuts(mut self, cuts: [f64; 3]) -> Self {
        self.band_cuts = cuts;
        self
    }

    /// The model being served
    pub fn model(&self) -> &TrainedModel {
        &self.model
    }

    /// Score one raw record
    pub fn predict(&self, record: &InferenceRecord) -> Result<PredictionResult> {
        let mut features = encode_features(record, &self.model.encoding, &self.model.impute)?;
        if self.model.scaled_features {
            self.model.scaler.transform_row(&mut features);
        }
        let probability = self
            .model
            .model
            .predict_proba_row(&features)?
            .clamp(0.0, 1.0);
        Ok(PredictionResult {
            label: u8::from(probability >= self.threshold),
            probability,
            band: RiskBand::from_probability(probability, self.band_cuts),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_BAND_CUTS;
    use crate::model::Algorithm;
    use crate::preprocess::{EncodingTable, ImputeStats};
    use crate::split::ScalerParameters;
    use crate::train::Trainer;
    use crate::Error;
    use ndarray::Array2;

    fn service() -> PredictionService {
        // Age (feature 1) separates the classes; other features constant
        let mut rows = Vec::new();
        let mut y = Vec::new();
        for i in 0..20 {
            let mut low = vec![0.0; 10];
            low[1] = 30.0 + i as f64;
            rows.extend(low);
            y.push(0u8);
            let mut high = vec![0.0; 10];
            high[1] = 70.0 + i as f64;
            rows.extend(high);
            y.push(1u8);
        }
        let x = Array2::from_shape_vec((40, 10), rows).unwrap();
        let trainer = Trainer {
            encoding: EncodingTable::from_schema(),
            scaler: ScalerParameters {
                mean: vec![0.0; 10],
                std: vec![1.0; 10],
            },
            impute: ImputeStats { bmi_median: 28.0 },
        };
        let trained = trainer.train(Algorithm::DecisionTree, &x, &y).unwrap();
        PredictionService::from_model(trained)
    }

    fn record(age: f64) -> InferenceRecord {
        InferenceRecord {
            gender: "Male".to_string(),
            age,
            hypertension: 0,
            heart_disease: 0,
            ever_married: "No".to_string(),
            work_type: "Private".to_string(),
            residence_type: "Urban".to_string(),
            avg_glucose_level: 90.0,
            bmi: Some(25.0),
            smoking_status: "never smoked".to_string(),
        }
    }

    #[test]
    fn test_band_boundaries() {
        let cuts = DEFAULT_BAND_CUTS;
        assert_eq!(RiskBand::from_probability(0.0, cuts), RiskBand::Low);
        assert_eq!(RiskBand::from_probability(0.2499, cuts), RiskBand::Low);
        // Lower-inclusive boundaries
        assert_eq!(RiskBand::from_probability(0.25, cuts), RiskBand::Moderate);
        assert_eq!(RiskBand::from_probability(0.50, cuts), RiskBand::Elevated);
        assert_eq!(RiskBand::from_probability(0.75, cuts), RiskBand::High);
        // Top band closed at 1.0
        assert_eq!(RiskBand::from_probability(1.0, cuts), RiskBand::High);
    }

    #[test]
    fn test_band_ordering_monotone() {
        let cuts = DEFAULT_BAND_CUTS;
        let probs = [0.0, 0.1, 0.25, 0.4, 0.5, 0.6, 0.75, 0.9, 1.0];
        for pair in probs.windows(2) {
            let b1 = RiskBand::from_probability(pair[0], cuts);
            let b2 = RiskBand::from_probability(pair[1], cuts);
            assert!(b1 <= b2, "band({}) > band({})", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_predict_high_and_low_risk() {
        let svc = service();
        let high = svc.predict(&record(85.0)).unwrap();
        assert_eq!(high.label, 1);
        assert!(high.probability > 0.5);
        assert_eq!(high.band, RiskBand::High);

        let low = svc.predict(&record(35.0)).unwrap();
        assert_eq!(low.label, 0);
        assert!(low.probability < 0.5);
        assert_eq!(low.band, RiskBand::Low);
    }

    #[test]
    fn test_probability_always_in_unit_interval() {
        let svc = service();
        for age in [0.0, 25.0, 50.0, 75.0, 110.0] {
            let result = svc.predict(&record(age)).unwrap();
            assert!((0.0..=1.0).contains(&result.probability));
        }
    }

    #[test]
    fn test_unknown_category_rejected_without_prediction() {
        let svc = service();
        let mut rec = record(50.0);
        rec.work_type = "Retired".to_string();
        let err = svc.predict(&rec).unwrap_err();
        match err {
            Error::UnknownCategory { field, value } => {
                assert_eq!(field, "work_type");
                assert_eq!(value, "Retired");
            }
            other => panic!("expected UnknownCategory, got {other}"),
        }
    }

    #[test]
    fn test_missing_bmi_imputed_with_training_median() {
        let svc = service();
        let mut rec = record(40.0);
        rec.bmi = None;
        // Imputation must not fail the call
        let result = svc.predict(&rec).unwrap();
        assert!((0.0..=1.0).contains(&result.probability));
    }

    #[test]
    fn test_invalid_record_is_schema_error() {
        let svc = service();
        let mut rec = record(50.0);
        rec.age = -3.0;
        assert!(matches!(svc.predict(&rec), Err(Error::Schema(_))));
    }

    #[test]
    fn test_custom_threshold_changes_label_not_probability() {
        let svc = service();
        let p = svc.predict(&record(85.0)).unwrap();
        let strict = service().with_threshold(0.99);
        let q = strict.predict(&record(85.0)).unwrap();
        assert_eq!(p.probability, q.probability);
        assert_eq!(q.label, u8::from(q.probability >= 0.99));
    }

    #[test]
    fn test_custom_band_cuts() {
        let svc = service().with_band_cuts([0.1, 0.2, 0.3]);
        let result = svc.predict(&record(85.0)).unwrap();
        // Probability near 1.0 lands in the top band under any cuts
        assert_eq!(result.band, RiskBand::High);
    }

    #[test]
    fn test_prediction_result_serializes_bands_lowercase() {
        let result = PredictionResult {
            label: 1,
            probability: 0.8,
            band: RiskBand::High,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"band\":\"high\""));
    }

    #[test]
    fn test_load_refuses_missing_artifact() {
        assert!(matches!(
            PredictionService::load("/nonexistent/model.json"),
            Err(Error::Artifact(_))
        ));
    }
}
