//! Gradient-boosted trees with logistic loss
//!
//! Stagewise additive model: start from the training log-odds, then fit
//! each regression tree to the current probability residuals and add it
//! with shrinkage. The tuned hyperparameter set trades more, shallower
//! learning steps for the default's faster fit.

use super::tree::{grow_tree, TreeNode, TreeParams};
use super::{check_training_data, sigmoid, Classifier};
use crate::{Error, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Gradient boosting hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostingParams {
    /// Number of boosting stages
    pub n_estimators: usize,
    /// Shrinkage applied to each stage
    pub learning_rate: f64,
    /// Depth limit of each stage's tree
    pub max_depth: usize,
    /// Minimum rows required to attempt a split
    pub min_samples_split: usize,
}

impl Default for GradientBoostingParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_split: 2,
        }
    }
}

impl GradientBoostingParams {
    /// The tuned hyperparameter set used by the comparison harness
    pub fn tuned() -> Self {
        Self {
            n_estimators: 200,
            learning_rate: 0.05,
            max_depth: 4,
            min_samples_split: 2,
        }
    }
}

/// Fitted gradient-boosted ensemble
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingClassifier {
    params: GradientBoostingParams,
    /// Initial prediction: log-odds of the training positive rate
    init_score: f64,
    trees: Vec<TreeNode>,
    fitted: bool,
}

impl GradientBoostingClassifier {
    /// Unfitted ensemble with the given hyperparameters
    pub fn new(params: GradientBoostingParams) -> Self {
        Self {
            params,
            init_score: 0.0,
            trees: Vec::new(),
            fitted: false,
        }
    }

    /// Hyperparameters
    pub fn params(&self) -> &GradientBoostingParams {
        &self.params
    }

    /// Number of fitted boosting stages
    pub fn n_stages(&self) -> usize {
        self.trees.len()
    }

    fn decision(&self, row: &[f64]) -> f64 {
        let boost: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        self.init_score + self.params.learning_rate * boost
    }
}

impl Classifier for GradientBoostingClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[u8]) -> Result<()> {
        check_training_data(x, y)?;
        if self.params.n_estimators == 0 {
            return Err(Error::Training(
                "gradient boosting needs at least one stage".to_string(),
            ));
        }

        let n = x.nrows();
        let pos_rate = y.iter().filter(|&&v| v == 1).count() as f64 / n as f64;
        let p = pos_rate.clamp(1e-6, 1.0 - 1e-6);
        self.init_score = (p / (1.0 - p)).ln();

        let tree_params = TreeParams {
            max_depth: self.params.max_depth,
            min_samples_split: self.params.min_samples_split,
        };
        let indices: Vec<usize> = (0..n).collect();
        let features: Vec<usize> = (0..x.ncols()).collect();

        let mut scores = vec![self.init_score; n];
        let mut residuals = vec![0.0; n];
        self.trees = Vec::with_capacity(self.params.n_estimators);
        let rows: Vec<Vec<f64>> = x.rows().into_iter().map(|r| r.to_vec()).collect();
        for _ in 0..self.params.n_estimators {
            for i in 0..n {
                residuals[i] = f64::from(y[i]) - sigmoid(scores[i]);
            }
            let tree = grow_tree(x, &residuals, &indices, &features, &tree_params, 0);
            for i in 0..n {
                scores[i] += self.params.learning_rate * tree.predict(&rows[i]);
            }
            self.trees.push(tree);
        }
        self.fitted = true;
        Ok(())
    }

    fn predict_proba_row(&self, row: &[f64]) -> Result<f64> {
        if !self.fitted {
            return Err(Error::Training(
                "gradient boosting model is not fitted".to_string(),
            ));
        }
        Ok(sigmoid(self.decision(row)))
    }
}
