//! Binary classification metrics and curve data
//!
//! Computes accuracy, precision, recall, F1, confusion counts, and the
//! ROC / precision-recall curves with their areas, all from one fitted
//! model and one held-out partition. The same model's probabilities feed
//! both the scalar metrics and the curves.

use crate::model::{Classifier, ClassifierModel};
use crate::{Error, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary confusion-matrix counts; positive class is stroke = 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl ConfusionMatrix {
    /// Tally predictions against ground truth
    pub fn from_predictions(y_pred: &[u8], y_true: &[u8]) -> Result<Self> {
        if y_pred.len() != y_true.len() {
            return Err(Error::Evaluation(format!(
                "predictions ({}) and labels ({}) disagree in length",
                y_pred.len(),
                y_true.len()
            )));
        }
        let mut cm = Self {
            true_positives: 0,
            false_positives: 0,
            true_negatives: 0,
            false_negatives: 0,
        };
        for (&pred, &truth) in y_pred.iter().zip(y_true.iter()) {
            match (truth, pred) {
                (1, 1) => cm.true_positives += 1,
                (0, 1) => cm.false_positives += 1,
                (0, 0) => cm.true_negatives += 1,
                (1, 0) => cm.false_negatives += 1,
                _ => {
                    return Err(Error::Evaluation(format!(
                        "labels must be 0 or 1, got true={truth} pred={pred}"
                    )))
                }
            }
        }
        Ok(cm)
    }

    /// Total samples
    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    /// Fraction of correct predictions
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.true_positives + self.true_negatives) as f64 / total as f64
    }

    /// Positive predictive value; NaN when nothing was predicted positive
    pub fn precision(&self) -> f64 {
        let denom = self.true_positives + self.false_positives;
        if denom == 0 {
            return f64::NAN;
        }
        self.true_positives as f64 / denom as f64
    }

    /// True-positive rate; NaN when there are no positive labels
    pub fn recall(&self) -> f64 {
        let denom = self.true_positives + self.false_negatives;
        if denom == 0 {
            return f64::NAN;
        }
        self.true_positives as f64 / denom as f64
    }

    /// Harmonic mean of precision and recall; NaN propagates
    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p.is_nan() || r.is_nan() {
            return f64::NAN;
        }
        if p + r == 0.0 {
            return 0.0;
        }
        2.0 * p * r / (p + r)
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "            Pred 0  Pred 1")?;
        writeln!(
            f,
            "True 0  {:>10} {:>7}",
            self.true_negatives, self.false_positives
        )?;
        write!(
            f,
            "True 1  {:>10} {:>7}",
            self.false_negatives, self.true_positives
        )
    }
}

/// One point on the ROC curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RocPoint {
    pub false_positive_rate: f64,
    pub true_positive_rate: f64,
}

/// One point on the precision-recall curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrPoint {
    pub recall: f64,
    pub precision: f64,
}

/// Metrics and curves for one model on one test partition.
///
/// Recomputed whole on every `evaluate` call; never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub roc_auc: f64,
    pub pr_auc: f64,
    pub confusion_matrix: ConfusionMatrix,
    #[serde(rename = "roc_curve_points")]
    pub roc_curve: Vec<RocPoint>,
    #[serde(rename = "pr_curve_points")]
    pub pr_curve: Vec<PrPoint>,
}

/// Evaluate a fitted model on a held-out partition at the given decision
/// threshold.
pub fn evaluate(
    model: &ClassifierModel,
    x_test: &Array2<f64>,
    y_test: &[u8],
    threshold: f64,
) -> Result<EvaluationResult> {
    if x_test.nrows() != y_test.len() {
        return Err(Error::Evaluation(format!(
            "feature rows ({}) and labels ({}) disagree",
            x_test.nrows(),
            y_test.len()
        )));
    }
    if y_test.is_empty() {
        return Err(Error::Evaluation("test partition is empty".to_string()));
    }

    let probabilities = model.predict_proba(x_test)?;
    let predictions: Vec<u8> = probabilities
        .iter()
        .map(|&p| u8::from(p >= threshold))
        .collect();
    let confusion = ConfusionMatrix::from_predictions(&predictions, y_test)?;

    let roc = roc_curve(&probabilities, y_test)?;
    let pr = pr_curve(&probabilities, y_test)?;
    Ok(EvaluationResult {
        accuracy: confusion.accuracy(),
        precision: confusion.precision(),
        recall: confusion.recall(),
        f1: confusion.f1(),
        roc_auc: trapezoid_area(roc.iter().map(|p| (p.false_positive_rate, p.true_positive_rate))),
        pr_auc: trapezoid_area(pr.iter().map(|p| (p.recall, p.precision))),
        confusion_matrix: confusion,
        roc_curve: roc,
        pr_curve: pr,
    })
}

/// ROC points across descending probability thresholds, from (0,0) to (1,1)
pub fn roc_curve(probabilities: &[f64], y_true: &[u8]) -> Result<Vec<RocPoint>> {
    let (order, pos, neg) = ranked(probabilities, y_true)?;
    if pos == 0 || neg == 0 {
        return Err(Error::Evaluation(
            "ROC curve needs both classes in the test labels".to_string(),
        ));
    }

    let mut points = vec![RocPoint {
        false_positive_rate: 0.0,
        true_positive_rate: 0.0,
    }];
    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut k = 0;
    while k < order.len() {
        // Step over ties so equal scores move the curve in one jump
        let score = probabilities[order[k]];
        while k < order.len() && probabilities[order[k]] == score {
            if y_true[order[k]] == 1 {
                tp += 1;
            } else {
                fp += 1;
            }
            k += 1;
        }
        points.push(RocPoint {
            false_positive_rate: fp as f64 / neg as f64,
            true_positive_rate: tp as f64 / pos as f64,
        });
    }
    Ok(points)
}

/// Precision-recall points across descending thresholds, starting from the
/// (recall = 0, precision = 1) convention
pub fn pr_curve(probabilities: &[f64], y_true: &[u8]) -> Result<Vec<PrPoint>> {
    let (order, pos, _) = ranked(probabilities, y_true)?;
    if pos == 0 {
        return Err(Error::Evaluation(
            "precision-recall curve needs positive test labels".to_string(),
        ));
    }

    let mut points = vec![PrPoint {
        recall: 0.0,
        precision: 1.0,
    }];
    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut k = 0;
    while k < order.len() {
        let score = probabilities[order[k]];
        while k < order.len() && probabilities[order[k]] == score {
            if y_true[order[k]] == 1 {
                tp += 1;
            } else {
                fp += 1;
            }
            k += 1;
        }
        points.push(PrPoint {
            recall: tp as f64 / pos as f64,
            precision: tp as f64 / (tp + fp) as f64,
        });
    }
    Ok(points)
}

/// Indices sorted by descending probability, plus class counts
fn ranked(probabilities: &[f64], y_true: &[u8]) -> Result<(Vec<usize>, usize, usize)> {
    if probabilities.len() != y_true.len() {
        return Err(Error::Evaluation(format!(
            "probabilities ({}) and labels ({}) disagree in length",
            probabilities.len(),
            y_true.len()
        )));
    }
    if probabilities.iter().any(|p| p.is_nan()) {
        return Err(Error::Evaluation(
            "probabilities contain NaN".to_string(),
        ));
    }
    let mut order: Vec<usize> = (0..probabilities.len()).collect();
    order.sort_by(|&a, &b| probabilities[b].total_cmp(&probabilities[a]));
    let pos = y_true.iter().filter(|&&v| v == 1).count();
    Ok((order, pos, y_true.len() - pos))
}

/// Area under a piecewise-linear curve given as (x, y) points with
/// non-decreasing x
fn trapezoid_area(points: impl Iterator<Item = (f64, f64)>) -> f64 {
    let points: Vec<(f64, f64)> = points.collect();
    points
        .windows(2)
        .map(|w| (w[1].0 - w[0].0) * (w[0].1 + w[1].1) / 2.0)
        .sum()
}
