//! Gaussian naive Bayes
//!
//! Per-class, per-feature Gaussian likelihoods with a variance-smoothing
//! floor. Probabilities come from the normalized joint log-likelihoods.

use super::{check_training_data, Classifier};
use crate::{Error, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Gaussian naive Bayes hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaussianNbParams {
    /// Fraction of the largest feature variance added to every variance,
    /// keeping likelihoods finite for near-constant features
    pub var_smoothing: f64,
}

impl Default for GaussianNbParams {
    fn default() -> Self {
        Self {
            var_smoothing: 1e-9,
        }
    }
}

/// Per-class Gaussian statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ClassStats {
    log_prior: f64,
    mean: Vec<f64>,
    var: Vec<f64>,
}

/// Fitted Gaussian naive Bayes model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaussianNbClassifier {
    params: GaussianNbParams,
    /// Statistics for class 0 then class 1
    classes: Vec<ClassStats>,
}

impl GaussianNbClassifier {
    /// Unfitted model with the given hyperparameters
    pub fn new(params: GaussianNbParams) -> Self {
        Self {
            params,
            classes: Vec::new(),
        }
    }

    /// Hyperparameters
    pub fn params(&self) -> &GaussianNbParams {
        &self.params
    }

    fn log_likelihood(&self, stats: &ClassStats, row: &[f64]) -> f64 {
        let mut ll = stats.log_prior;
        for ((&v, &mean), &var) in row.iter().zip(&stats.mean).zip(&stats.var) {
            ll += -0.5 * (2.0 * std::f64::consts::PI * var).ln()
                - (v - mean).powi(2) / (2.0 * var);
        }
        ll
    }
}

impl Classifier for GaussianNbClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[u8]) -> Result<()> {
        check_training_data(x, y)?;
        let m = x.ncols();
        let n = x.nrows() as f64;

        // Smoothing floor proportional to the largest overall variance
        let mut max_var = 0.0f64;
        for col in x.columns() {
            let mean = col.sum() / n;
            let var = col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            max_var = max_var.max(var);
        }
        let epsilon = (self.params.var_smoothing * max_var).max(1e-12);

        self.classes = (0u8..2)
            .map(|label| {
                let indices: Vec<usize> = y
                    .iter()
                    .enumerate()
                    .filter(|(_, &v)| v == label)
                    .map(|(i, _)| i)
                    .collect();
                let count = indices.len() as f64;
                let mut mean = vec![0.0; m];
                let mut var = vec![0.0; m];
                for &i in &indices {
                    for (j, v) in x.row(i).iter().enumerate() {
                        mean[j] += v;
                    }
                }
                mean.iter_mut().for_each(|v| *v /= count);
                for &i in &indices {
                    for (j, v) in x.row(i).iter().enumerate() {
                        var[j] += (v - mean[j]).powi(2);
                    }
                }
                var.iter_mut().for_each(|v| *v = *v / count + epsilon);
                ClassStats {
                    log_prior: (count / n).ln(),
                    mean,
                    var,
                }
            })
            .collect();
        Ok(())
    }

    fn predict_proba_row(&self, row: &[f64]) -> Result<f64> {
        if self.classes.len() != 2 {
            return Err(Error::Training(
                "naive Bayes model is not fitted".to_string(),
            ));
        }
        let ll0 = self.log_likelihood(&self.classes[0], row);
        let ll1 = self.log_likelihood(&self.classes[1], row);
        // Normalize in log space to avoid under/overflow
        let max = ll0.max(ll1);
        let e0 = (ll0 - max).exp();
        let e1 = (ll1 - max).exp();
        Ok(e1 / (e0 + e1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn gaussian_clusters() -> (Array2<f64>, Vec<u8>) {
        // Deterministic pseudo-gaussian clusters around 0 and 5
        let mut rows = Vec::new();
        let mut y = Vec::new();
        for i in 0..30 {
            let wiggle = ((i * 7919) % 100) as f64 / 100.0 - 0.5;
            rows.extend([wiggle, -wiggle]);
            y.push(0u8);
            rows.extend([5.0 + wiggle, 5.0 - wiggle]);
            y.push(1u8);
        }
        (Array2::from_shape_vec((60, 2), rows).unwrap(), y)
    }

    #[test]
    fn test_nb_separates_clusters() {
        let (x, y) = gaussian_clusters();
        let mut model = GaussianNbClassifier::new(GaussianNbParams::default());
        model.fit(&x, &y).unwrap();
        assert!(model.predict_proba_row(&[0.0, 0.0]).unwrap() < 0.1);
        assert!(model.predict_proba_row(&[5.0, 5.0]).unwrap() > 0.9);
    }

    #[test]
    fn test_nb_probabilities_sum_to_one() {
        let (x, y) = gaussian_clusters();
        let mut model = GaussianNbClassifier::new(GaussianNbParams::default());
        model.fit(&x, &y).unwrap();
        // P(1|x) computed directly; P(0|x) = 1 - P(1|x) by construction,
        // so just check the bounds hold far from the data
        for row in [[-100.0, 100.0], [100.0, -100.0], [2.5, 2.5]] {
            let p = model.predict_proba_row(&row).unwrap();
            assert!((0.0..=1.0).contains(&p));
            assert!(p.is_finite());
        }
    }

    #[test]
    fn test_nb_prior_shifts_probability() {
        // Imbalanced classes at the same midpoint: prior decides
        let x = array![[0.0], [0.2], [0.4], [0.6], [0.8], [1.0], [0.5]];
        let y = vec![0, 0, 0, 0, 0, 0, 1];
        let mut model = GaussianNbClassifier::new(GaussianNbParams::default());
        model.fit(&x, &y).unwrap();
        // A point near the shared center should lean to the majority class
        assert!(model.predict_proba_row(&[0.5]).unwrap() < 0.5);
    }

    #[test]
    fn test_nb_constant_feature_survives_smoothing() {
        let x = array![[1.0, 0.0], [1.0, 1.0], [1.0, 2.0], [1.0, 3.0]];
        let y = vec![0, 0, 1, 1];
        let mut model = GaussianNbClassifier::new(GaussianNbParams::default());
        model.fit(&x, &y).unwrap();
        let p = model.predict_proba_row(&[1.0, 2.5]).unwrap();
        assert!(p.is_finite());
        assert!(p > 0.5);
    }

    #[test]
    fn test_unfitted_model_errors() {
        let model = GaussianNbClassifier::new(GaussianNbParams::default());
        assert!(model.predict_proba_row(&[0.0]).is_err());
    }

    #[test]
    fn test_nb_serde_round_trip() {
        let (x, y) = gaussian_clusters();
        let mut model = GaussianNbClassifier::new(GaussianNbParams::default());
        model.fit(&x, &y).unwrap();
        let json = serde_json::to_string(&model).unwrap();
        let restored: GaussianNbClassifier = serde_json::from_str(&json).unwrap();
        let row = [1.0, 2.0];
        assert_eq!(
            model.predict_proba_row(&row).unwrap(),
            restored.predict_proba_row(&row).unwrap()
        );
    }
}
