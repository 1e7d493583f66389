//! Error handling for dissolved-oxygen correction runs.
//!
//! Provides error types with enough context (file, column, parameter)
//! to diagnose a failed batch without inspecting internals.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO error on {path}: {source}")]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Configuration error for '{parameter}': {message}")]
    Configuration { parameter: String, message: String },

    #[error("Missing column '{column}' in file: {path}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Invalid format in file: {path} - {reason}")]
    InvalidFormat { path: PathBuf, reason: String },

    #[error("Invalid timestamp '{value}' at line {line} in file: {path}")]
    InvalidTimestamp {
        path: PathBuf,
        line: usize,
        value: String,
    },

    #[error("Invalid number '{value}' in column '{column}' at line {line} in file: {path}")]
    InvalidNumber {
        path: PathBuf,
        line: usize,
        column: String,
        value: String,
    },

    #[error("Measurement directory not found at path: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("No measurement files with extension '.{extension}' found in: {directory}")]
    EmptyBatch {
        directory: PathBuf,
        extension: String,
    },

    #[error("Processing failed for file: {path} - {reason}")]
    ProcessingFailed { path: PathBuf, reason: String },
}

impl DoError {
    /// Create a configuration error for a named run parameter
    pub fn configuration(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Attach a path to an I/O error
    pub fn file_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileIo {
            path: path.into(),
            source,
        }
    }

    /// True for the errors caused by malformed input file contents
    pub fn is_input_format(&self) -> bool {
        matches!(
            self,
            Self::MissingColumn { .. }
                | Self::InvalidFormat { .. }
                | Self::InvalidTimestamp { .. }
                | Self::InvalidNumber { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DoError>;
