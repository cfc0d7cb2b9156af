//! Regression-style CART trees
//!
//! One tree builder serves both classification and boosting: it minimizes
//! within-node squared error over the targets, which for 0/1 targets is
//! equivalent to gini-based splitting, and leaves store the target mean
//! (the positive-class fraction for classification, the residual mean for
//! boosting).

use super::{check_training_data, Classifier};
use crate::{Error, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// A fitted tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum TreeNode {
    /// Terminal node holding the mean target of its training rows
    Leaf { value: f64 },
    /// Binary split: rows with `feature <= threshold` go left
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    /// Evaluate the tree on one feature vector
    pub fn predict(&self, row: &[f64]) -> f64 {
        match self {
            TreeNode::Leaf { value } => *value,
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if row[*feature] <= *threshold {
                    left.predict(row)
                } else {
                    right.predict(row)
                }
            }
        }
    }

    /// Number of leaves, for inspection
    pub fn n_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }

    /// Maximum depth below this node (a lone leaf has depth 0)
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Growth limits for a single tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// Maximum split depth
    pub max_depth: usize,
    /// Minimum rows required to attempt a split
    pub min_samples_split: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: 6,
            min_samples_split: 2,
        }
    }
}

/// Grow a tree on `targets` restricted to `indices`, considering only
/// `features` as split candidates.
pub(super) fn grow_tree(
    x: &Array2<f64>,
    targets: &[f64],
    indices: &[usize],
    features: &[usize],
    params: &TreeParams,
    depth: usize,
) -> TreeNode {
    let mean = node_mean(targets, indices);
    if depth >= params.max_depth || indices.len() < params.min_samples_split {
        return TreeNode::Leaf { value: mean };
    }
    let Some((feature, threshold)) = best_split(x, targets, indices, features) else {
        return TreeNode::Leaf { value: mean };
    };

    let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .partition(|&&i| x[[i, feature]] <= threshold);
    if left_idx.is_empty() || right_idx.is_empty() {
        return TreeNode::Leaf { value: mean };
    }

    TreeNode::Split {
        feature,
        threshold,
        left: Box::new(grow_tree(x, targets, &left_idx, features, params, depth + 1)),
        right: Box::new(grow_tree(x, targets, &right_idx, features, params, depth + 1)),
    }
}

fn node_mean(targets: &[f64], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| targets[i]).sum::<f64>() / indices.len() as f64
}

/// Best (feature, threshold) by squared-error reduction, scanning split
/// points between consecutive distinct values with running prefix sums.
fn best_split(
    x: &Array2<f64>,
    targets: &[f64],
    indices: &[usize],
    features: &[usize],
) -> Option<(usize, f64)> {
    let n = indices.len() as f64;
    let total: f64 = indices.iter().map(|&i| targets[i]).sum();
    let total_sq: f64 = indices.iter().map(|&i| targets[i] * targets[i]).sum();
    let parent_sse = total_sq - total * total / n;

    let mut best: Option<(f64, usize, f64)> = None;
    for &feature in features {
        let mut column: Vec<(f64, f64)> = indices
            .iter()
            .map(|&i| (x[[i, feature]], targets[i]))
            .collect();
        column.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for (k, &(value, target)) in column.iter().enumerate().take(column.len() - 1) {
            left_sum += target;
            left_sq += target * target;
            let next_value = column[k + 1].0;
            if next_value <= value {
                continue;
            }
            let n_left = (k + 1) as f64;
            let n_right = n - n_left;
            let right_sum = total - left_sum;
            let right_sq = total_sq - left_sq;
            let sse = (left_sq - left_sum * left_sum / n_left)
                + (right_sq - right_sum * right_sum / n_right);
            let gain = parent_sse - sse;
            if gain > 1e-12 && best.map_or(true, |(g, _, _)| gain > g) {
                best = Some((gain, feature, (value + next_value) / 2.0));
            }
        }
    }
    best.map(|(_, feature, threshold)| (feature, threshold))
}

/// A single CART decision tree; leaf values are positive-class fractions,
/// so prediction is already a probability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeClassifier {
    params: TreeParams,
    root: Option<TreeNode>,
}

impl DecisionTreeClassifier {
    /// Unfitted tree with the given growth limits
    pub fn new(params: TreeParams) -> Self {
        Self { params, root: None }
    }

    /// Growth limits
    pub fn params(&self) -> &TreeParams {
        &self.params
    }

    /// The fitted root, if any
    pub fn root(&self) -> Option<&TreeNode> {
        self.root.as_ref()
    }
}

impl Classifier for DecisionTreeClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[u8]) -> Result<()> {
        check_training_data(x, y)?;
        let targets: Vec<f64> = y.iter().map(|&v| f64::from(v)).collect();
        let indices: Vec<usize> = (0..x.nrows()).collect();
        let features: Vec<usize> = (0..x.ncols()).collect();
        self.root = Some(grow_tree(x, &targets, &indices, &features, &self.params, 0));
        Ok(())
    }

    fn predict_proba_row(&self, row: &[f64]) -> Result<f64> {
        let root = self
            .root
            .as_ref()
            .ok_or_else(|| Error::Training("decision tree is not fitted".to_string()))?;
        Ok(root.predict(row).clamp(0.0, 1.0))
    }
}
