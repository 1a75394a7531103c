//! Pipeline error type.

use thiserror::Error;

/// Result type for pipeline runs.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input loading failed
    #[error(transparent)]
    Data(#[from] pulse_data::DataError),

    /// A feature stage failed
    #[error(transparent)]
    Feature(#[from] pulse_features::FeatureError),

    /// Finalization or export failed
    #[error(transparent)]
    Output(#[from] pulse_output::OutputError),

    /// Configuration file could not be read
    #[error("Failed to read config {path}: {source}")]
    Config {
        /// Config file path
        path: std::path::PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
