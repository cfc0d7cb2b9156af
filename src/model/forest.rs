//! Random forest classifier
//!
//! Bagged CART trees: each tree trains on a bootstrap resample and a
//! random feature subset of size ~sqrt(n_features). The ensemble
//! probability is the mean of the per-tree leaf fractions.

use super::tree::{grow_tree, TreeNode, TreeParams};
use super::{check_training_data, Classifier};
use crate::{Error, Result};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Random forest hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestParams {
    /// Number of trees
    pub n_estimators: usize,
    /// Per-tree growth limits
    pub max_depth: usize,
    /// Minimum rows required to attempt a split
    pub min_samples_split: usize,
    /// Bootstrap/feature-subset RNG seed
    pub seed: u64,
}

impl Default for RandomForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 10,
            min_samples_split: 2,
            seed: 42,
        }
    }
}

/// Fitted random forest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    params: RandomForestParams,
    trees: Vec<TreeNode>,
}

impl RandomForestClassifier {
    /// Unfitted forest with the given hyperparameters
    pub fn new(params: RandomForestParams) -> Self {
        Self {
            params,
            trees: Vec::new(),
        }
    }

    /// Hyperparameters
    pub fn params(&self) -> &RandomForestParams {
        &self.params
    }

    /// Number of fitted trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Classifier for RandomForestClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[u8]) -> Result<()> {
        check_training_data(x, y)?;
        if self.params.n_estimators == 0 {
            return Err(Error::Training(
                "random forest needs at least one tree".to_string(),
            ));
        }

        let n = x.nrows();
        let n_features = x.ncols();
        let subset_size = (n_features as f64).sqrt().ceil() as usize;
        let targets: Vec<f64> = y.iter().map(|&v| f64::from(v)).collect();
        let tree_params = TreeParams {
            max_depth: self.params.max_depth,
            min_samples_split: self.params.min_samples_split,
        };

        let mut rng = StdRng::seed_from_u64(self.params.seed);
        let all_features: Vec<usize> = (0..n_features).collect();
        self.trees = (0..self.params.n_estimators)
            .map(|_| {
                let bootstrap: Vec<usize> =
                    (0..n).map(|_| rng.random_range(0..n)).collect();
                let mut features = all_features.clone();
                features.shuffle(&mut rng);
                features.truncate(subset_size.max(1));
                grow_tree(x, &targets, &bootstrap, &features, &tree_params, 0)
            })
            .collect();
        Ok(())
    }

    fn predict_proba_row(&self, row: &[f64]) -> Result<f64> {
        if self.trees.is_empty() {
            return Err(Error::Training("random forest is not fitted".to_string()));
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        Ok((sum / self.trees.len() as f64).clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clusters() -> (Array2<f64>, Vec<u8>) {
        let mut rows = Vec::new();
        let mut y = Vec::new();
        for i in 0..25 {
            rows.extend([i as f64 * 0.1, 1.0, 0.0]);
            y.push(0u8);
            rows.extend([8.0 + i as f64 * 0.1, -1.0, 4.0]);
            y.push(1u8);
        }
        (Array2::from_shape_vec((50, 3), rows).unwrap(), y)
    }

    #[test]
    fn test_forest_separates_clusters() {
        let (x, y) = clusters();
        let mut forest = RandomForestClassifier::new(RandomForestParams {
            n_estimators: 25,
            ..RandomForestParams::default()
        });
        forest.fit(&x, &y).unwrap();
        assert_eq!(forest.n_trees(), 25);
        assert!(forest.predict_proba_row(&[1.0, 1.0, 0.0]).unwrap() < 0.3);
        assert!(forest.predict_proba_row(&[9.0, -1.0, 4.0]).unwrap() > 0.7);
    }

    #[test]
    fn test_forest_deterministic_per_seed() {
        let (x, y) = clusters();
        let params = RandomForestParams {
            n_estimators: 10,
            seed: 7,
            ..RandomForestParams::default()
        };
        let mut a = RandomForestClassifier::new(params.clone());
        let mut b = RandomForestClassifier::new(params);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        let row = [4.0, 0.0, 2.0];
        assert_eq!(
            a.predict_proba_row(&row).unwrap(),
            b.predict_proba_row(&row).unwrap()
        );
    }

    #[test]
    fn test_forest_zero_estimators_rejected() {
        let (x, y) = clusters();
        let mut forest = RandomForestClassifier::new(RandomForestParams {
            n_estimators: 0,
            ..RandomForestParams::default()
        });
        assert!(forest.fit(&x, &y).is_err());
    }

    #[test]
    fn test_unfitted_forest_errors() {
        let forest = RandomForestClassifier::new(RandomForestParams::default());
        assert!(forest.predict_proba_row(&[0.0; 3]).is_err());
    }

    #[test]
    fn test_forest_serde_round_trip() {
        let (x, y) = clusters();
        let mut forest = RandomForestClassifier::new(RandomForestParams {
            n_estimators: 5,
            ..RandomForestParams::default()
        });
        forest.fit(&x, &y).unwrap();
        let json = serde_json::to_string(&forest).unwrap();
        let restored: RandomForestClassifier = serde_json::from_str(&json).unwrap();
        let row = [2.0, 0.5, 1.0];
        assert_eq!(
            forest.predict_proba_row(&row).unwrap(),
            restored.predict_proba_row(&row).unwrap()
        );
    }
}
