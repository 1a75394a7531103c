//! Error types for finalization and export.

use thiserror::Error;

/// Result type for output operations.
pub type Result<T> = std::result::Result<T, OutputError>;

/// Errors that can occur while finalizing or exporting a dataset.
#[derive(Debug, Error)]
pub enum OutputError {
    /// No row survived the missing-data policy
    #[error("Empty dataset after {0}")]
    EmptyDataset(String),

    /// Input table lacks a required column
    #[error("Missing column '{0}'")]
    MissingColumn(String),

    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Feature helper error
    #[error(transparent)]
    Feature(#[from] pulse_features::FeatureError),
}
