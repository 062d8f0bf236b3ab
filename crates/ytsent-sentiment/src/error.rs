use thiserror::Error;
use ytsent_youtube::CollectorError;

#[derive(Debug, Error)]
pub enum ClassificationError {
    /// The backend ran but reported a failure.
    #[error("sentiment backend error: {0}")]
    Backend(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend returned a different number of predictions than inputs.
    #[error("sentiment backend returned {got} predictions for {expected} inputs")]
    LengthMismatch { expected: usize, got: usize },
}

/// Failure of the collect-then-classify pipeline.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Collector(#[from] CollectorError),

    #[error(transparent)]
    Classification(#[from] ClassificationError),
}
