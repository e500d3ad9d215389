//! Error types for demflow

use thiserror::Error;

/// Main error type for demflow operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid raster dimensions: {rows}x{cols} (at least 2x2 required)")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Row on line {line} has {found} values, expected {expected}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Cannot parse value '{token}' on line {line}")]
    InvalidValue { line: usize, token: String },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for demflow operations
pub type Result<T> = std::result::Result<T, Error>;
