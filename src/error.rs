use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File unavailable: {path}: {source}")]
    FileUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed line {line_number}: {source}")]
    MalformedLine {
        line_number: usize,
        #[source]
        source: ParseError,
    },

    #[error("CSV writing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

/// Why a single observation line was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected {expected} tab-separated fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("empty region code")]
    EmptyRegionCode,

    #[error("invalid {field}: '{value}'")]
    InvalidNumber { field: &'static str, value: String },
}
