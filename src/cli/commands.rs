//! CLI command implementations

use crate::artifact::Artifact;
use crate::cli::{
    apply_overrides, Cli, Command, CompareArgs, InfoArgs, LogLevel, PredictArgs, TrainArgs,
};
use crate::config::PipelineConfig;
use crate::dataset::Dataset;
use crate::eval::EvaluationResult;
use crate::model::Algorithm;
use crate::pipeline::{self, Leaderboard};
use crate::predict::PredictionService;
use crate::schema::InferenceRecord;

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<(), String> {
    let level = if cli.quiet {
        LogLevel::Quiet
    } else if cli.verbose {
        LogLevel::Verbose
    } else {
        LogLevel::Normal
    };

    match cli.command {
        Command::Train(args) => run_train(args, level),
        Command::Compare(args) => run_compare(args, level),
        Command::Predict(args) => run_predict(args, level),
        Command::Info(args) => run_info(args, level),
    }
}

fn load_pipeline_config(path: Option<&std::path::Path>) -> Result<PipelineConfig, String> {
    match path {
        Some(path) => PipelineConfig::from_path(path).map_err(|e| format!("Config error: {e}")),
        None => Ok(PipelineConfig::default()),
    }
}

fn run_train(args: TrainArgs, level: LogLevel) -> Result<(), String> {
    let algorithm: Algorithm = args
        .algorithm
        .parse()
        .map_err(|e| format!("Argument error: {e}"))?;

    let mut config = load_pipeline_config(args.config.as_deref())?;
    apply_overrides(&mut config, &args);
    config.validate().map_err(|e| format!("Config error: {e}"))?;

    level.emit(
        LogLevel::Normal,
        &format!("Training {} on {}", algorithm.name(), args.data.display()),
    );

    let dataset = Dataset::from_csv_path(&args.data).map_err(|e| format!("Data error: {e}"))?;
    let (n_negative, n_positive) = dataset
        .class_counts()
        .map_err(|e| format!("Data error: {e}"))?;
    level.emit(
        LogLevel::Verbose,
        &format!(
            "  {} records ({n_positive} positive, {n_negative} negative)",
            dataset.records.len()
        ),
    );

    let run =
        pipeline::run(&config, &dataset, algorithm).map_err(|e| format!("Training error: {e}"))?;

    level.emit(
        LogLevel::Verbose,
        &format!(
            "  Fit {} samples in {} ms",
            run.model.n_train_samples, run.model.training_duration_ms
        ),
    );
    print_evaluation(&run.evaluation, level);

    Artifact::new(run.model)
        .save(&args.output)
        .map_err(|e| format!("Artifact error: {e}"))?;
    level.emit(
        LogLevel::Normal,
        &format!("Model saved to {}", args.output.display()),
    );
    Ok(())
}

fn run_compare(args: CompareArgs, level: LogLevel) -> Result<(), String> {
    let mut config = load_pipeline_config(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.validate().map_err(|e| format!("Config error: {e}"))?;

    level.emit(
        LogLevel::Normal,
        &format!(
            "Comparing {} algorithms on {}",
            Algorithm::ALL.len(),
            args.data.display()
        ),
    );

    let dataset = Dataset::from_csv_path(&args.data).map_err(|e| format!("Data error: {e}"))?;
    let results = pipeline::compare(&config, &dataset, Algorithm::ALL)
        .map_err(|e| format!("Training error: {e}"))?;

    if level != LogLevel::Quiet {
        println!("{}", Leaderboard(&results));
    }
    Ok(())
}

fn run_predict(args: PredictArgs, level: LogLevel) -> Result<(), String> {
    let mut service =
        PredictionService::load(&args.model).map_err(|e| format!("Artifact error: {e}"))?;
    if let Some(threshold) = args.threshold {
        service = service.with_threshold(threshold);
    }

    let text = std::fs::read_to_string(&args.record)
        .map_err(|e| format!("Cannot read record '{}': {e}", args.record.display()))?;
    let record: InferenceRecord =
        serde_json::from_str(&text).map_err(|e| format!("Record parse error: {e}"))?;

    let result = service
        .predict(&record)
        .map_err(|e| format!("Prediction error: {e}"))?;

    level.emit(
        LogLevel::Verbose,
        &format!("  Model: {}", service.model().algorithm.name()),
    );
    if level != LogLevel::Quiet {
        let json =
            serde_json::to_string_pretty(&result).map_err(|e| format!("Output error: {e}"))?;
        println!("{json}");
    }
    Ok(())
}

fn run_info(args: InfoArgs, level: LogLevel) -> Result<(), String> {
    let artifact = Artifact::load(&args.model).map_err(|e| format!("Artifact error: {e}"))?;

    if args.json {
        let summary = serde_json::json!({
            "format_version": artifact.format_version,
            "schema_version": artifact.schema_version,
            "created_at": artifact.created_at,
            "algorithm": artifact.model.algorithm.id(),
            "hyperparameters": artifact.model.hyperparameters,
            "scaled_features": artifact.model.scaled_features,
            "n_train_samples": artifact.model.n_train_samples,
            "training_duration_ms": artifact.model.training_duration_ms,
        });
        if level != LogLevel::Quiet {
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).map_err(|e| format!("Output error: {e}"))?
            );
        }
        return Ok(());
    }

    level.emit(
        LogLevel::Normal,
        &format!("Artifact: {}", args.model.display()),
    );
    level.emit(
        LogLevel::Normal,
        &format!(
            "  Format v{} / schema v{}",
            artifact.format_version, artifact.schema_version
        ),
    );
    level.emit(
        LogLevel::Normal,
        &format!("  Algorithm: {}", artifact.model.algorithm.name()),
    );
    level.emit(
        LogLevel::Normal,
        &format!("  Trained at: {}", artifact.model.trained_at),
    );
    level.emit(
        LogLevel::Normal,
        &format!(
            "  Training set: {} samples, {} ms",
            artifact.model.n_train_samples, artifact.model.training_duration_ms
        ),
    );
    level.emit(
        LogLevel::Verbose,
        &format!("  Hyperparameters: {}", artifact.model.hyperparameters),
    );
    Ok(())
}

fn print_evaluation(result: &EvaluationResult, level: LogLevel) {
    level.emit(LogLevel::Normal, "Test-set metrics:");
    level.emit(
        LogLevel::Normal,
        &format!("  Accuracy:  {:.4}", result.accuracy),
    );
    level.emit(
        LogLevel::Normal,
        &format!("  Precision: {:.4}", result.precision),
    );
    level.emit(
        LogLevel::Normal,
        &format!("  Recall:    {:.4}", result.recall),
    );
    level.emit(LogLevel::Normal, &format!("  F1:        {:.4}", result.f1));
    level.emit(
        LogLevel::Normal,
        &format!("  ROC-AUC:   {:.4}", result.roc_auc),
    );
    level.emit(
        LogLevel::Normal,
        &format!("  PR-AUC:    {:.4}", result.pr_auc),
    );
    level.emit(
        LogLevel::Verbose,
        &format!("  Confusion: {}", result.confusion_matrix),
    );
}
