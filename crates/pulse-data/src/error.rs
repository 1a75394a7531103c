//! Error types for data operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while loading pipeline inputs.
#[derive(Debug, Error)]
pub enum DataError {
    /// A required input file is absent
    #[error("Missing input: {}", path.display())]
    MissingInput {
        /// Path that was expected to exist
        path: PathBuf,
    },

    /// An input file exists but contains no usable rows
    #[error("Empty input: {}", path.display())]
    EmptyInput {
        /// Path of the empty input
        path: PathBuf,
    },

    /// Required column absent from a tabular input
    #[error("Missing column '{column}' in {}", path.display())]
    MissingColumn {
        /// Column that was expected
        column: String,
        /// File that was read
        path: PathBuf,
    },

    /// Date string that none of the supported formats accept
    #[error("Unparseable date: {0}")]
    InvalidDate(String),

    /// Unknown asset class label
    #[error("Unknown asset class: {0}")]
    InvalidAssetClass(String),

    /// Unknown sentiment label
    #[error("Unknown sentiment label: {0}")]
    InvalidSentimentLabel(String),

    /// Data parsing error
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
