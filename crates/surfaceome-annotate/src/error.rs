//! Error types for surfaceome-annotate
//!
//! Degraded remote lookups are not errors: they are encoded as data
//! (absent sequence, unknown topology). Everything here aborts the run.

use thiserror::Error;

/// Result type alias for annotation operations
pub type Result<T> = std::result::Result<T, AnnotateError>;

#[derive(Error, Debug)]
pub enum AnnotateError {
    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read or write table: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Input table lacks a column the annotation needs
    #[error("Required column '{column}' not found in {path}")]
    MissingColumn { column: String, path: String },

    #[error("Configuration error: {0}")]
    Config(String),

    /// A row task failed; carries the input row index
    #[error("Row {index} failed: {source}")]
    RowFailed {
        index: usize,
        #[source]
        source: Box<AnnotateError>,
    },

    /// A row task panicked or was cancelled before returning
    #[error("Row {index} task aborted: {message}")]
    Task { index: usize, message: String },
}

impl AnnotateError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn missing_column(column: impl Into<String>, path: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
            path: path.into(),
        }
    }

    pub fn row_failed(index: usize, source: AnnotateError) -> Self {
        Self::RowFailed {
            index,
            source: Box::new(source),
        }
    }

    /// Row index attached to a row-level failure, if any
    pub fn row_index(&self) -> Option<usize> {
        match self {
            Self::RowFailed { index, .. } | Self::Task { index, .. } => Some(*index),
            _ => None,
        }
    }
}
