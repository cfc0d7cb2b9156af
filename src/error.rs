//! Error types for the risk-scoring pipeline

use thiserror::Error;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or missing input fields. Fatal for the call, not the process.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Inference-time categorical value that was never seen at training time.
    /// The request is rejected; there is no silent default code.
    #[error("Unknown category '{value}' for field '{field}'")]
    UnknownCategory {
        /// Field whose value was not in the training encoding
        field: String,
        /// The offending value
        value: String,
    },

    /// Degenerate training data (empty set, single class)
    #[error("Training error: {0}")]
    Training(String),

    /// Mismatched feature/label shapes during evaluation
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// Missing, corrupt, or incompatible persisted model
    #[error("Artifact error: {0}")]
    Artifact(String),

    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;
