use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A persisted record lacks a required field. Skipped during bulk load.
    #[error("Malformed record at index {index}: missing or invalid field '{field}'")]
    MalformedRecord { index: usize, field: &'static str },

    /// `ScanLog::append` was handed an id already in the log.
    #[error("Duplicate record id: {0}")]
    DuplicateId(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
