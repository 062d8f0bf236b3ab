use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("unsupported export format: {0}")]
    UnsupportedFormat(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no free file name for {0} after repeated attempts")]
    NameExhausted(String),
}
