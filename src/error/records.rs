use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("No input file at '{path}'.")]
    NotFound { path: PathBuf },
    #[error("Failed to open '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Input '{path}' has no '{column}' column in its header.")]
    MissingColumn {
        path: PathBuf,
        column: &'static str,
    },
    #[error("Invalid log pattern: {source}")]
    Pattern {
        #[source]
        source: regex::Error,
    },
    #[error("Failed to create '{path}': {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
