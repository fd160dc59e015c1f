//! Error types for the countsim library.

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Read depth cannot have values less than or equal to zero (row {row}: {value})")]
    InvalidDepth { row: usize, value: f64 },

    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    #[error("Row {0} sums to zero and cannot be closed")]
    EmptyRow(usize),

    #[error("Negative value {value} at row {row}, column {col}")]
    NegativeValue { value: f64, row: usize, col: usize },

    #[error("Number of blocks needs to be greater than 1, got {0}")]
    InvalidBlockCount(usize),

    #[error("Unknown distribution '{name}', must be one of: {allowed}")]
    UnknownDistribution { name: String, allowed: String },

    #[error("Invalid count value '{value}' at row {row}, column {col}")]
    InvalidCount {
        value: String,
        row: usize,
        col: usize,
    },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Numerical error: {0}")]
    Numerical(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, SimError>;
