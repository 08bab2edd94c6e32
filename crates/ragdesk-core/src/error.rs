use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// No embedding credential or capability is configured.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Persisted index missing, unreadable or inconsistent.
    #[error("Index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("Failed to ingest {}: {reason}", .path.display())]
    Ingestion { path: PathBuf, reason: String },

    #[error("No chunks to index")]
    EmptyCorpus,

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
