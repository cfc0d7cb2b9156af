//! RBF-kernel support-vector classifier
//!
//! Trained with the simplified SMO procedure over a Gaussian kernel. Only
//! the support vectors are kept after fitting, so the persisted model stays
//! small. The probability output squashes the margin distance through a
//! logistic function, which is monotone in the decision value; threshold
//! and risk-band ordering are therefore preserved.

use super::{check_training_data, sigmoid, Classifier};
use crate::{Error, Result};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Support-vector classifier hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvcParams {
    /// Soft-margin penalty
    pub c: f64,
    /// RBF kernel width; `exp(-gamma * ||a - b||^2)`
    pub gamma: f64,
    /// KKT violation tolerance
    pub tol: f64,
    /// Consecutive full passes without updates before stopping
    pub max_passes: usize,
    /// Hard cap on outer iterations
    pub max_iter: usize,
    /// RNG seed for the SMO partner choice
    pub seed: u64,
}

impl Default for SvcParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            gamma: 0.1,
            tol: 1e-3,
            max_passes: 5,
            max_iter: 200,
            seed: 42,
        }
    }
}

/// Fitted support-vector classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SvcClassifier {
    params: SvcParams,
    /// Support vectors (rows with non-zero multiplier)
    support: Vec<Vec<f64>>,
    /// `alpha_i * y_i` per support vector, with y in {-1, +1}
    coefficients: Vec<f64>,
    bias: f64,
    fitted: bool,
}

impl SvcClassifier {
    /// Unfitted classifier with the given hyperparameters
    pub fn new(params: SvcParams) -> Self {
        Self {
            params,
            support: Vec::new(),
            coefficients: Vec::new(),
            bias: 0.0,
            fitted: false,
        }
    }

    /// Hyperparameters
    pub fn params(&self) -> &SvcParams {
        &self.params
    }

    /// Number of retained support vectors
    pub fn n_support(&self) -> usize {
        self.support.len()
    }

    fn kernel(&self, a: &[f64], b: &[f64]) -> f64 {
        let dist_sq: f64 = a.iter().zip(b.iter()).map(|(&u, &v)| (u - v).powi(2)).sum();
        (-self.params.gamma * dist_sq).exp()
    }

    /// Signed margin distance
    pub fn decision(&self, row: &[f64]) -> Result<f64> {
        if !self.fitted {
            return Err(Error::Training(
                "support-vector model is not fitted".to_string(),
            ));
        }
        let sum: f64 = self
            .support
            .iter()
            .zip(self.coefficients.iter())
            .map(|(sv, &coef)| coef * self.kernel(sv, row))
            .sum();
        Ok(sum + self.bias)
    }
}

impl Classifier for SvcClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[u8]) -> Result<()> {
        check_training_data(x, y)?;
        let n = x.nrows();
        let rows: Vec<Vec<f64>> = x.rows().into_iter().map(|r| r.to_vec()).collect();
        let targets: Vec<f64> = y.iter().map(|&v| if v == 1 { 1.0 } else { -1.0 }).collect();

        let mut alphas = vec![0.0f64; n];
        let mut bias = 0.0f64;
        let mut rng = StdRng::seed_from_u64(self.params.seed);

        let decision = |alphas: &[f64], bias: f64, row: &[f64], this: &Self| -> f64 {
            let mut sum = bias;
            for (i, &a) in alphas.iter().enumerate() {
                if a > 0.0 {
                    sum += a * targets[i] * this.kernel(&rows[i], row);
                }
            }
            sum
        };

        let c = self.params.c;
        let mut passes = 0;
        let mut iter = 0;
        while passes < self.params.max_passes && iter < self.params.max_iter {
            let mut num_changed = 0;
            for i in 0..n {
                let e_i = decision(&alphas, bias, &rows[i], self) - targets[i];
                let violates = (targets[i] * e_i < -self.params.tol && alphas[i] < c)
                    || (targets[i] * e_i > self.params.tol && alphas[i] > 0.0);
                if !violates {
                    continue;
                }
                let mut j = rng.random_range(0..n - 1);
                if j >= i {
                    j += 1;
                }
                let e_j = decision(&alphas, bias, &rows[j], self) - targets[j];

                let (alpha_i_old, alpha_j_old) = (alphas[i], alphas[j]);
                let (low, high) = if (targets[i] - targets[j]).abs() > f64::EPSILON {
                    let gap = alpha_j_old - alpha_i_old;
                    (gap.max(0.0), (c + gap).min(c))
                } else {
                    let total = alpha_i_old + alpha_j_old;
                    ((total - c).max(0.0), total.min(c))
                };
                if (high - low).abs() < f64::EPSILON {
                    continue;
                }

                let k_ii = self.kernel(&rows[i], &rows[i]);
                let k_jj = self.kernel(&rows[j], &rows[j]);
                let k_ij = self.kernel(&rows[i], &rows[j]);
                let eta = 2.0 * k_ij - k_ii - k_jj;
                if eta >= 0.0 {
                    continue;
                }

                let alpha_j = (alpha_j_old - targets[j] * (e_i - e_j) / eta).clamp(low, high);
                if (alpha_j - alpha_j_old).abs() < 1e-5 {
                    continue;
                }
                let alpha_i = alpha_i_old + targets[i] * targets[j] * (alpha_j_old - alpha_j);
                alphas[i] = alpha_i;
                alphas[j] = alpha_j;

                let b1 = bias
                    - e_i
                    - targets[i] * (alpha_i - alpha_i_old) * k_ii
                    - targets[j] * (alpha_j - alpha_j_old) * k_ij;
                let b2 = bias
                    - e_j
                    - targets[i] * (alpha_i - alpha_i_old) * k_ij
                    - targets[j] * (alpha_j - alpha_j_old) * k_jj;
                bias = if alpha_i > 0.0 && alpha_i < c {
                    b1
                } else if alpha_j > 0.0 && alpha_j < c {
                    b2
                } else {
                    (b1 + b2) / 2.0
                };
                num_changed += 1;
            }
            passes = if num_changed == 0 { passes + 1 } else { 0 };
            iter += 1;
        }

        self.support = Vec::new();
        self.coefficients = Vec::new();
        for i in 0..n {
            if alphas[i] > 1e-8 {
                self.support.push(rows[i].clone());
                self.coefficients.push(alphas[i] * targets[i]);
            }
        }
        self.bias = bias;
        self.fitted = true;
        Ok(())
    }

    fn predict_proba_row(&self, row: &[f64]) -> Result<f64> {
        Ok(sigmoid(self.decision(row)?))
    }
}
