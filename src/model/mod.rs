//! Classifier algorithms for binary risk scoring
//!
//! Every algorithm implements the same fit / predict / predict-probability
//! capability and is selected through the typed [`Algorithm`] enum rather
//! than control flow scattered across a UI. Fitted models live in the
//! serializable [`ClassifierModel`] enum so one artifact format covers all
//! variants.

mod bayes;
mod boosting;
mod forest;
mod linear;
mod svm;
mod tree;

pub use bayes::{GaussianNbClassifier, GaussianNbParams};
pub use boosting::{GradientBoostingClassifier, GradientBoostingParams};
pub use forest::{RandomForestClassifier, RandomForestParams};
pub use linear::{LogisticRegressionClassifier, LogisticRegressionParams};
pub use svm::{SvcClassifier, SvcParams};
pub use tree::{DecisionTreeClassifier, TreeNode, TreeParams};

use crate::{Error, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The supported classifier algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Gradient-boosted trees with default hyperparameters
    GradientBoosting,
    /// Gradient-boosted trees with the tuned hyperparameter set
    GradientBoostingTuned,
    /// Random forest
    RandomForest,
    /// Single decision tree
    DecisionTree,
    /// L2-regularized logistic regression
    LogisticRegression,
    /// Gaussian naive Bayes
    GaussianNaiveBayes,
    /// RBF-kernel support-vector classifier
    SupportVector,
}

impl Algorithm {
    /// All algorithm variants, in comparison order
    pub const ALL: &'static [Algorithm] = &[
        Algorithm::GradientBoosting,
        Algorithm::GradientBoostingTuned,
        Algorithm::RandomForest,
        Algorithm::DecisionTree,
        Algorithm::LogisticRegression,
        Algorithm::GaussianNaiveBayes,
        Algorithm::SupportVector,
    ];

    /// Stable identifier used in CLI arguments and artifacts
    pub fn id(&self) -> &'static str {
        match self {
            Algorithm::GradientBoosting => "gradient_boosting",
            Algorithm::GradientBoostingTuned => "gradient_boosting_tuned",
            Algorithm::RandomForest => "random_forest",
            Algorithm::DecisionTree => "decision_tree",
            Algorithm::LogisticRegression => "logistic_regression",
            Algorithm::GaussianNaiveBayes => "gaussian_naive_bayes",
            Algorithm::SupportVector => "support_vector",
        }
    }

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::GradientBoosting => "Gradient Boosting",
            Algorithm::GradientBoostingTuned => "Gradient Boosting (tuned)",
            Algorithm::RandomForest => "Random Forest",
            Algorithm::DecisionTree => "Decision Tree",
            Algorithm::LogisticRegression => "Logistic Regression",
            Algorithm::GaussianNaiveBayes => "Gaussian Naive Bayes",
            Algorithm::SupportVector => "Support Vector (RBF)",
        }
    }

    /// Whether this algorithm expects standardized features.
    ///
    /// Margin-based and linear classifiers are distance/gradient sensitive;
    /// tree ensembles split on raw thresholds and are scale-invariant.
    pub fn needs_scaling(&self) -> bool {
        matches!(
            self,
            Algorithm::LogisticRegression | Algorithm::GaussianNaiveBayes | Algorithm::SupportVector
        )
    }

    /// An unfitted model with this algorithm's default hyperparameters
    pub fn default_model(&self) -> ClassifierModel {
        match self {
            Algorithm::GradientBoosting => ClassifierModel::GradientBoosting(
                GradientBoostingClassifier::new(GradientBoostingParams::default()),
            ),
            Algorithm::GradientBoostingTuned => ClassifierModel::GradientBoosting(
                GradientBoostingClassifier::new(GradientBoostingParams::tuned()),
            ),
            Algorithm::RandomForest => ClassifierModel::RandomForest(
                RandomForestClassifier::new(RandomForestParams::default()),
            ),
            Algorithm::DecisionTree => ClassifierModel::DecisionTree(
                DecisionTreeClassifier::new(TreeParams::default()),
            ),
            Algorithm::LogisticRegression => ClassifierModel::LogisticRegression(
                LogisticRegressionClassifier::new(LogisticRegressionParams::default()),
            ),
            Algorithm::GaussianNaiveBayes => ClassifierModel::GaussianNaiveBayes(
                GaussianNbClassifier::new(GaussianNbParams::default()),
            ),
            Algorithm::SupportVector => {
                ClassifierModel::SupportVector(SvcClassifier::new(SvcParams::default()))
            }
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Algorithm::ALL
            .iter()
            .copied()
            .find(|a| a.id() == s)
            .ok_or_else(|| Error::Training(format!("unknown algorithm '{s}'")))
    }
}

/// Common fit/predict/predict-probability capability
pub trait Classifier {
    /// Fit on a training feature matrix and 0/1 labels
    fn fit(&mut self, x: &Array2<f64>, y: &[u8]) -> Result<()>;

    /// Positive-class probability for a single feature vector
    fn predict_proba_row(&self, row: &[f64]) -> Result<f64>;

    /// Positive-class probabilities for every row
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Vec<f64>> {
        let mut out = Vec::with_capacity(x.nrows());
        for row in x.rows() {
            let row: Vec<f64> = row.iter().copied().collect();
            out.push(self.predict_proba_row(&row)?);
        }
        Ok(out)
    }

    /// Hard 0/1 predictions at a decision threshold
    fn predict(&self, x: &Array2<f64>, threshold: f64) -> Result<Vec<u8>> {
        Ok(self
            .predict_proba(x)?
            .into_iter()
            .map(|p| u8::from(p >= threshold))
            .collect())
    }
}

/// A fitted (or fittable) classifier of any supported algorithm.
///
/// An enum rather than a trait object so the whole model serializes into
/// one artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierModel {
    GradientBoosting(GradientBoostingClassifier),
    RandomForest(RandomForestClassifier),
    DecisionTree(DecisionTreeClassifier),
    LogisticRegression(LogisticRegressionClassifier),
    GaussianNaiveBayes(GaussianNbClassifier),
    SupportVector(SvcClassifier),
}

impl ClassifierModel {
    /// The hyperparameter set as a JSON value, for artifact metadata
    pub fn hyperparameters(&self) -> serde_json::Value {
        let result = match self {
            ClassifierModel::GradientBoosting(m) => serde_json::to_value(m.params()),
            ClassifierModel::RandomForest(m) => serde_json::to_value(m.params()),
            ClassifierModel::DecisionTree(m) => serde_json::to_value(m.params()),
            ClassifierModel::LogisticRegression(m) => serde_json::to_value(m.params()),
            ClassifierModel::GaussianNaiveBayes(m) => serde_json::to_value(m.params()),
            ClassifierModel::SupportVector(m) => serde_json::to_value(m.params()),
        };
        result.unwrap_or(serde_json::Value::Null)
    }
}

impl Classifier for ClassifierModel {
    fn fit(&mut self, x: &Array2<f64>, y: &[u8]) -> Result<()> {
        match self {
            ClassifierModel::GradientBoosting(m) => m.fit(x, y),
            ClassifierModel::RandomForest(m) => m.fit(x, y),
            ClassifierModel::DecisionTree(m) => m.fit(x, y),
            ClassifierModel::LogisticRegression(m) => m.fit(x, y),
            ClassifierModel::GaussianNaiveBayes(m) => m.fit(x, y),
            ClassifierModel::SupportVector(m) => m.fit(x, y),
        }
    }

    fn predict_proba_row(&self, row: &[f64]) -> Result<f64> {
        match self {
            ClassifierModel::GradientBoosting(m) => m.predict_proba_row(row),
            ClassifierModel::RandomForest(m) => m.predict_proba_row(row),
            ClassifierModel::DecisionTree(m) => m.predict_proba_row(row),
            ClassifierModel::LogisticRegression(m) => m.predict_proba_row(row),
            ClassifierModel::GaussianNaiveBayes(m) => m.predict_proba_row(row),
            ClassifierModel::SupportVector(m) => m.predict_proba_row(row),
        }
    }
}

/// Guard shared by every `fit` implementation: the training set must be
/// non-empty and contain both classes.
pub(crate) fn check_training_data(x: &Array2<f64>, y: &[u8]) -> Result<()> {
    if x.nrows() == 0 || y.is_empty() {
        return Err(Error::Training("training set is empty".to_string()));
    }
    if x.nrows() != y.len() {
        return Err(Error::Training(format!(
            "feature rows ({}) and labels ({}) disagree",
            x.nrows(),
            y.len()
        )));
    }
    let pos = y.iter().filter(|&&v| v == 1).count();
    if pos == 0 || pos == y.len() {
        return Err(Error::Training(
            "training set contains a single class".to_string(),
        ));
    }
    Ok(())
}

/// Numerically safe logistic function
pub(crate) fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
