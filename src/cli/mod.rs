//! CLI for the stroke risk pipeline
//!
//! Argument types and command handlers. Every command maps onto one
//! library entry point; the handlers only parse arguments, apply
//! overrides, and format output.

mod commands;

pub use commands::run_command;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Output verbosity for the command handlers
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Errors only
    Quiet,
    /// Progress and results
    Normal,
    /// Everything, plus per-step detail (record counts, fit durations,
    /// confusion counts)
    Verbose,
}

impl LogLevel {
    fn permits(self, required: LogLevel) -> bool {
        match self {
            LogLevel::Quiet => false,
            LogLevel::Normal => required == LogLevel::Normal,
            LogLevel::Verbose => true,
        }
    }

    /// Print `msg` when this level shows messages tagged `required`
    pub fn emit(self, required: LogLevel, msg: &str) {
        if self.permits(required) {
            println!("{msg}");
        }
    }
}

/// Prevenir: stroke risk scoring pipeline
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "prevenir")]
#[command(version)]
#[command(about = "Stroke risk scoring: train, compare, and serve tabular classifiers")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Train one algorithm and persist the model artifact
    Train(TrainArgs),

    /// Train every algorithm on identical partitions and print a leaderboard
    Compare(CompareArgs),

    /// Score a single patient record against a saved artifact
    Predict(PredictArgs),

    /// Display information about a saved artifact
    Info(InfoArgs),
}

/// Arguments for the train command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct TrainArgs {
    /// Path to the training CSV
    #[arg(value_name = "DATA")]
    pub data: PathBuf,

    /// Algorithm to train (see `compare` for the full list)
    #[arg(short, long, default_value = "gradient_boosting_tuned")]
    pub algorithm: String,

    /// Where to write the model artifact
    #[arg(short, long, default_value = "model.json")]
    pub output: PathBuf,

    /// Pipeline configuration file (YAML or JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the held-out test fraction
    #[arg(long)]
    pub test_fraction: Option<f64>,

    /// Override the decision threshold
    #[arg(long)]
    pub threshold: Option<f64>,
}

/// Arguments for the compare command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct CompareArgs {
    /// Path to the training CSV
    #[arg(value_name = "DATA")]
    pub data: PathBuf,

    /// Pipeline configuration file (YAML or JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the random seed
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for the predict command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct PredictArgs {
    /// Path to the model artifact
    #[arg(value_name = "MODEL")]
    pub model: PathBuf,

    /// Path to a JSON file holding one patient record
    #[arg(value_name = "RECORD")]
    pub record: PathBuf,

    /// Override the decision threshold
    #[arg(long)]
    pub threshold: Option<f64>,
}

/// Arguments for the info command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct InfoArgs {
    /// Path to the model artifact
    #[arg(value_name = "MODEL")]
    pub model: PathBuf,

    /// Emit machine-readable JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Parse CLI arguments from a string slice (for testing)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}

/// Apply command-line overrides on top of a loaded configuration
pub fn apply_overrides(config: &mut crate::config::PipelineConfig, args: &TrainArgs) {
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(fraction) = args.test_fraction {
        config.test_fraction = fraction;
    }
    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }
}
