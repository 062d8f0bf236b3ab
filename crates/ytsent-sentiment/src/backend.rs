//! Capability interface over a sentiment model.

use async_trait::async_trait;
use ytsent_core::SentimentLabel;

use crate::error::ClassificationError;

/// Raw model output for one text, before thresholds and rounding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Prediction {
    /// Continuous polarity, nominally in `[-1.0, 1.0]`.
    Score(f32),
    /// Categorical output with the model's confidence in `[0.0, 1.0]`.
    Label {
        label: SentimentLabel,
        confidence: f32,
    },
}

/// A text → prediction model.
///
/// `predict_batch` must return exactly one prediction per input, in input
/// order. Implementations never see blank text.
#[async_trait]
pub trait SentimentBackend: Send + Sync {
    async fn predict_batch(&self, texts: &[String]) -> Result<Vec<Prediction>, ClassificationError>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}
