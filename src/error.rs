//! Error types for serving-bench

use thiserror::Error;

/// Crate error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (unknown backend, bad request rate, ...)
    #[error("configuration error: {0}")]
    Config(String),

    /// Dataset loading or sampling error
    #[error("dataset error: {0}")]
    Dataset(String),

    /// Statistics requested over zero observations
    #[error("no observations recorded; cannot compute statistics")]
    EmptyResults,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client construction error
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// A spawned benchmark task panicked or was cancelled
    #[error("benchmark task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// JSON serialization error
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
