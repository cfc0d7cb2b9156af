//! End-to-end training/evaluation harness
//!
//! One sequential batch: preprocess the raw dataset, split it, balance the
//! training partition with SMOTE, fit the scaler on the balanced training
//! partition, train the requested algorithm on scaled or unscaled features
//! as it requires, and evaluate on the untouched test partition. The same
//! fitted model produces both the scalar metrics and the curves.

use crate::config::PipelineConfig;
use crate::dataset::Dataset;
use crate::eval::{evaluate, EvaluationResult};
use crate::model::Algorithm;
use crate::preprocess::Preprocessor;
use crate::resample::Smote;
use crate::split::{train_test_split, ScalerParameters};
use crate::train::{TrainedModel, Trainer};
use crate::Result;
use std::fmt;

/// Outcome of one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineRun {
    /// The fitted model with its preprocessing metadata
    pub model: TrainedModel,
    /// Metrics on the held-out test partition
    pub evaluation: EvaluationResult,
}

/// Run the full pipeline for one algorithm
pub fn run(config: &PipelineConfig, dataset: &Dataset, algorithm: Algorithm) -> Result<PipelineRun> {
    config.validate()?;
    let (encoded, encoding, impute) = Preprocessor::fit_transform(dataset)?;
    let split = train_test_split(&encoded, config.test_fraction, config.seed)?;

    // Balance training only; resampling before the split would leak
    // synthetic points correlated with test rows
    let smote = Smote::new(config.smote_k, config.seed);
    let (x_balanced, y_balanced) = smote.balance(&split.x_train, &split.y_train)?;

    let scaler = ScalerParameters::fit(&x_balanced)?;
    let trainer = Trainer {
        encoding,
        scaler: scaler.clone(),
        impute,
    };

    let (model, x_test) = if algorithm.needs_scaling() {
        let trained = trainer.train(algorithm, &scaler.transform(&x_balanced), &y_balanced)?;
        (trained, scaler.transform(&split.x_test))
    } else {
        let trained = trainer.train(algorithm, &x_balanced, &y_balanced)?;
        (trained, split.x_test)
    };

    let evaluation = evaluate(&model.model, &x_test, &split.y_test, config.threshold)?;
    Ok(PipelineRun { model, evaluation })
}

/// Run every requested algorithm on identical partitions and collect the
/// results for comparison
pub fn compare(
    config: &PipelineConfig,
    dataset: &Dataset,
    algorithms: &[Algorithm],
) -> Result<Vec<(Algorithm, EvaluationResult)>> {
    algorithms
        .iter()
        .map(|&alg| run(config, dataset, alg).map(|r| (alg, r.evaluation)))
        .collect()
}

/// Comparison table sorted by ROC-AUC, best first
pub struct Leaderboard<'a>(pub &'a [(Algorithm, EvaluationResult)]);

impl fmt::Display for Leaderboard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<26} {:>9} {:>10} {:>8} {:>8} {:>9} {:>8}",
            "Model", "Accuracy", "Precision", "Recall", "F1", "ROC-AUC", "PR-AUC"
        )?;
        writeln!(f, "{}", "-".repeat(84))?;
        let mut rows: Vec<&(Algorithm, EvaluationResult)> = self.0.iter().collect();
        rows.sort_by(|a, b| b.1.roc_auc.total_cmp(&a.1.roc_auc));
        for (alg, result) in rows {
            writeln!(
                f,
                "{:<26} {:>9.4} {:>10.4} {:>8.4} {:>8.4} {:>9.4} {:>8.4}",
                alg.name(),
                result.accuracy,
                result.precision,
                result.recall,
                result.f1,
                result.roc_auc,
                result.pr_auc
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RawRecord;

    /// Imbalanced synthetic cohort: older high-glucose patients are the
    /// positive class
    fn cohort(n_neg: usize, n_pos: usize) -> Dataset {
        let mut records = Vec::new();
        for i in 0..n_neg {
            records.push(patient(i as u64, 30.0 + (i % 20) as f64, 85.0, 0));
        }
        for i in 0..n_pos {
            records.push(patient(
                (n_neg + i) as u64,
                70.0 + (i % 15) as f64,
                210.0,
                1,
            ));
        }
        Dataset { records }
    }

    fn patient(id: u64, age: f64, glucose: f64, stroke: u8) -> RawRecord {
        RawRecord {
            id,
            gender: if id % 2 == 0 { "Male" } else { "Female" }.to_string(),
            age,
            hypertension: (id % 7 == 0) as u8,
            heart_disease: (id % 11 == 0) as u8,
            ever_married: "Yes".to_string(),
            work_type: "Private".to_string(),
            residence_type: if id % 3 == 0 { "Urban" } else { "Rural" }.to_string(),
            avg_glucose_level: glucose + (id % 10) as f64,
            bmi: if id % 13 == 0 { None } else { Some(24.0 + (id % 12) as f64) },
            smoking_status: "never smoked".to_string(),
            stroke: Some(stroke),
        }
    }

    #[test]
    fn test_run_trains_and_evaluates() {
        let dataset = cohort(95, 25);
        let config = PipelineConfig::default();
        let run = run(&config, &dataset, Algorithm::DecisionTree).unwrap();
        assert!(run.evaluation.accuracy > 0.7);
        assert!(run.evaluation.roc_auc > 0.7);
        assert_eq!(run.model.algorithm, Algorithm::DecisionTree);
    }

    #[test]
    fn test_run_balances_training_partition() {
        let dataset = cohort(95, 25);
        let config = PipelineConfig::default();
        let run = run(&config, &dataset, Algorithm::DecisionTree).unwrap();
        // 120 rows, 24 held out; SMOTE doubles the training majority count
        let n_train = run.model.n_train_samples;
        assert!(n_train > 96, "training set was not oversampled: {n_train}");
        assert_eq!(n_train % 2, 0);
    }

    #[test]
    fn test_run_deterministic_per_seed() {
        let dataset = cohort(80, 20);
        let config = PipelineConfig::default();
        let a = run(&config, &dataset, Algorithm::DecisionTree).unwrap();
        let b = run(&config, &dataset, Algorithm::DecisionTree).unwrap();
        assert_eq!(a.evaluation.accuracy, b.evaluation.accuracy);
        assert_eq!(a.evaluation.roc_auc, b.evaluation.roc_auc);
        assert_eq!(
            a.evaluation.confusion_matrix,
            b.evaluation.confusion_matrix
        );
    }

    #[test]
    fn test_scaled_algorithm_records_flag() {
        let dataset = cohort(60, 20);
        let config = PipelineConfig::default();
        let run = run(&config, &dataset, Algorithm::LogisticRegression).unwrap();
        assert!(run.model.scaled_features);
    }

    #[test]
    fn test_compare_covers_all_requested() {
        let dataset = cohort(60, 20);
        let config = PipelineConfig::default();
        let algorithms = [Algorithm::DecisionTree, Algorithm::GaussianNaiveBayes];
        let results = compare(&config, &dataset, &algorithms).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, Algorithm::DecisionTree);
    }

    #[test]
    fn test_leaderboard_formats_all_rows() {
        let dataset = cohort(60, 20);
        let config = PipelineConfig::default();
        let results = compare(
            &config,
            &dataset,
            &[Algorithm::DecisionTree, Algorithm::GaussianNaiveBayes],
        )
        .unwrap();
        let table = format!("{}", Leaderboard(&results));
        assert!(table.contains("Decision Tree"));
        assert!(table.contains("Gaussian Naive Bayes"));
        assert!(table.contains("ROC-AUC"));
    }

    #[test]
    fn test_single_class_dataset_fails_training() {
        let dataset = cohort(50, 0);
        let config = PipelineConfig::default();
        assert!(run(&config, &dataset, Algorithm::DecisionTree).is_err());
    }
}
