//! Binary entry point for `prevenir`.
//!
//! Argument parsing and output formatting live in [`prevenir::cli`]; the
//! binary only maps the outcome to an exit code. A typical session:
//!
//! ```bash
//! prevenir compare stroke.csv
//! prevenir train stroke.csv --algorithm gradient_boosting_tuned --output model.json
//! prevenir predict model.json patient.json
//! prevenir info model.json
//! ```

use clap::Parser;
use prevenir::cli::{run_command, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run_command(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
