//! Error types for feature computation.

use thiserror::Error;

/// Result type for feature operations.
pub type Result<T> = std::result::Result<T, FeatureError>;

/// Errors raised by the feature stages.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// A stage would produce (or received) an empty table
    #[error("Empty dataset after {stage}")]
    EmptyDataset {
        /// Stage that ran out of rows
        stage: String,
    },

    /// Input frame lacks a column the stage needs
    #[error("{stage}: missing column '{column}'")]
    MissingColumn {
        /// Stage name
        stage: String,
        /// Column name
        column: String,
    },

    /// Null found where every row must have a value
    #[error("Null value in column '{0}'")]
    NullValue(String),

    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Input loading error
    #[error(transparent)]
    Data(#[from] pulse_data::DataError),
}
