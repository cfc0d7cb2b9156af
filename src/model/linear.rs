//! L2-regularized logistic regression
//!
//! Full-batch gradient descent on the regularized log-loss. Expects
//! standardized features; the harness scales them before fitting.

use super::{check_training_data, sigmoid, Classifier};
use crate::{Error, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Logistic regression hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegressionParams {
    /// Gradient-descent step size
    pub learning_rate: f64,
    /// L2 penalty strength
    pub l2: f64,
    /// Maximum gradient-descent iterations
    pub max_iter: usize,
    /// Stop early when the gradient norm falls below this
    pub tol: f64,
}

impl Default for LogisticRegressionParams {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            l2: 1.0,
            max_iter: 1000,
            tol: 1e-6,
        }
    }
}

/// Fitted logistic regression model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegressionClassifier {
    params: LogisticRegressionParams,
    weights: Vec<f64>,
    bias: f64,
    fitted: bool,
}

impl LogisticRegressionClassifier {
    /// Unfitted model with the given hyperparameters
    pub fn new(params: LogisticRegressionParams) -> Self {
        Self {
            params,
            weights: Vec::new(),
            bias: 0.0,
            fitted: false,
        }
    }

    /// Hyperparameters
    pub fn params(&self) -> &LogisticRegressionParams {
        &self.params
    }

    /// Fitted coefficients
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Fitted intercept
    pub fn bias(&self) -> f64 {
        self.bias
    }
}

impl Classifier for LogisticRegressionClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[u8]) -> Result<()> {
        check_training_data(x, y)?;
        let n = x.nrows();
        let m = x.ncols();
        let inv_n = 1.0 / n as f64;

        let mut weights = vec![0.0; m];
        let mut bias = 0.0;
        let mut grad_w = vec![0.0; m];
        for _ in 0..self.params.max_iter {
            grad_w.iter_mut().for_each(|g| *g = 0.0);
            let mut grad_b = 0.0;
            for (i, row) in x.rows().into_iter().enumerate() {
                let z = bias
                    + row
                        .iter()
                        .zip(weights.iter())
                        .map(|(&v, &w)| v * w)
                        .sum::<f64>();
                let err = sigmoid(z) - f64::from(y[i]);
                for (g, &v) in grad_w.iter_mut().zip(row.iter()) {
                    *g += err * v;
                }
                grad_b += err;
            }
            let mut norm_sq = 0.0;
            for (w, g) in weights.iter_mut().zip(grad_w.iter()) {
                let g = g * inv_n + self.params.l2 * *w * inv_n;
                *w -= self.params.learning_rate * g;
                norm_sq += g * g;
            }
            let gb = grad_b * inv_n;
            bias -= self.params.learning_rate * gb;
            norm_sq += gb * gb;
            if norm_sq.sqrt() < self.params.tol {
                break;
            }
        }

        self.weights = weights;
        self.bias = bias;
        self.fitted = true;
        Ok(())
    }

    fn predict_proba_row(&self, row: &[f64]) -> Result<f64> {
        if !self.fitted {
            return Err(Error::Training(
                "logistic regression model is not fitted".to_string(),
            ));
        }
        if row.len() != self.weights.len() {
            return Err(Error::Evaluation(format!(
                "expected {} features, got {}",
                self.weights.len(),
                row.len()
            )));
        }
        let z = self.bias
            + row
                .iter()
                .zip(self.weights.iter())
                .map(|(&v, &w)| v * w)
                .sum::<f64>();
        Ok(sigmoid(z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn separable() -> (Array2<f64>, Vec<u8>) {
        let mut rows = Vec::new();
        let mut y = Vec::new();
        for i in 0..20 {
            let jitter = (i as f64) * 0.01;
            rows.extend([-1.0 - jitter, -0.5]);
            y.push(0u8);
            rows.extend([1.0 + jitter, 0.5]);
            y.push(1u8);
        }
        (Array2::from_shape_vec((40, 2), rows).unwrap(), y)
    }

    #[test]
    fn test_logistic_separates_clusters() {
        let (x, y) = separable();
        let mut model = LogisticRegressionClassifier::new(LogisticRegressionParams::default());
        model.fit(&x, &y).unwrap();
        assert!(model.predict_proba_row(&[-1.0, -0.5]).unwrap() < 0.3);
        assert!(model.predict_proba_row(&[1.0, 0.5]).unwrap() > 0.7);
        // Positive direction gets a positive weight
        assert!(model.weights()[0] > 0.0);
    }

    #[test]
    fn test_probability_monotone_along_weight_direction() {
        let (x, y) = separable();
        let mut model = LogisticRegressionClassifier::new(LogisticRegressionParams::default());
        model.fit(&x, &y).unwrap();
        let p1 = model.predict_proba_row(&[-2.0, 0.0]).unwrap();
        let p2 = model.predict_proba_row(&[0.0, 0.0]).unwrap();
        let p3 = model.predict_proba_row(&[2.0, 0.0]).unwrap();
        assert!(p1 < p2 && p2 < p3);
    }

    #[test]
    fn test_l2_shrinks_weights() {
        let (x, y) = separable();
        let mut weak = LogisticRegressionClassifier::new(LogisticRegressionParams {
            l2: 0.0,
            ..LogisticRegressionParams::default()
        });
        let mut strong = LogisticRegressionClassifier::new(LogisticRegressionParams {
            l2: 50.0,
            ..LogisticRegressionParams::default()
        });
        weak.fit(&x, &y).unwrap();
        strong.fit(&x, &y).unwrap();
        let norm = |w: &[f64]| w.iter().map(|v| v * v).sum::<f64>().sqrt();
        assert!(norm(strong.weights()) < norm(weak.weights()));
    }

    #[test]
    fn test_feature_count_mismatch_rejected() {
        let (x, y) = separable();
        let mut model = LogisticRegressionClassifier::new(LogisticRegressionParams::default());
        model.fit(&x, &y).unwrap();
        assert!(model.predict_proba_row(&[1.0]).is_err());
    }

    #[test]
    fn test_unfitted_model_errors() {
        let model = LogisticRegressionClassifier::new(LogisticRegressionParams::default());
        assert!(model.predict_proba_row(&[0.0, 0.0]).is_err());
    }

    #[test]
    fn test_single_class_rejected() {
        let x = array![[1.0], [2.0]];
        let mut model = LogisticRegressionClassifier::new(LogisticRegressionParams::default());
        assert!(model.fit(&x, &[1, 1]).is_err());
    }

    #[test]
    fn test_logistic_serde_round_trip() {
        let (x, y) = separable();
        let mut model = LogisticRegressionClassifier::new(LogisticRegressionParams::default());
        model.fit(&x, &y).unwrap();
        let json = serde_json::to_string(&model).unwrap();
        let restored: LogisticRegressionClassifier = serde_json::from_str(&json).unwrap();
        let row = [0.3, -0.1];
        assert_eq!(
            model.predict_proba_row(&row).unwrap(),
            restored.predict_proba_row(&row).unwrap()
        );
    }
}
