//! Text → (label, score) classification over a pluggable backend.

use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use ytsent_core::{
    AppConfig, ClassifiedComment, Comment, SentimentBackendKind, SentimentLabel, SentimentResult,
};

use crate::backend::{Prediction, SentimentBackend};
use crate::error::ClassificationError;
use crate::inference::InferenceBackend;
use crate::scorer::LexiconBackend;

/// Longest input, in characters, passed to a backend.
pub const MAX_INPUT_CHARS: usize = 500;

pub const DEFAULT_BATCH_SIZE: usize = 32;
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Cut-offs that turn a continuous score into a label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentThresholds {
    /// Scores at or above this are positive.
    pub positive: f32,
    /// Scores at or below this are negative.
    pub negative: f32,
}

impl Default for SentimentThresholds {
    fn default() -> Self {
        Self {
            positive: 0.1,
            negative: -0.1,
        }
    }
}

impl SentimentThresholds {
    #[must_use]
    pub fn label_for(&self, score: f32) -> SentimentLabel {
        if score >= self.positive {
            SentimentLabel::Positive
        } else if score <= self.negative {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

/// Classifies comment text through a [`SentimentBackend`].
///
/// Blank text is never sent to the backend; it classifies as
/// [`SentimentResult::NEUTRAL`]. Scores are clamped to `[-1.0, 1.0]` and
/// rounded to three decimals.
#[derive(Clone)]
pub struct SentimentClassifier {
    backend: Arc<dyn SentimentBackend>,
    thresholds: SentimentThresholds,
    batch_size: usize,
    concurrency: usize,
}

impl SentimentClassifier {
    #[must_use]
    pub fn new(backend: Arc<dyn SentimentBackend>) -> Self {
        Self {
            backend,
            thresholds: SentimentThresholds::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Builds the classifier selected by `config.sentiment_backend`.
    ///
    /// # Errors
    ///
    /// Returns [`ClassificationError::Backend`] if the inference backend is
    /// selected without a URL, or [`ClassificationError::Http`] if its HTTP
    /// client cannot be built.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ClassificationError> {
        let backend: Arc<dyn SentimentBackend> = match config.sentiment_backend {
            SentimentBackendKind::Lexicon => Arc::new(LexiconBackend),
            SentimentBackendKind::Inference => {
                let url = config.sentiment_inference_url.as_deref().ok_or_else(|| {
                    ClassificationError::Backend("inference backend requires a URL".to_owned())
                })?;
                Arc::new(InferenceBackend::new(url)?)
            }
        };
        Ok(Self::new(backend)
            .with_thresholds(SentimentThresholds {
                positive: config.sentiment_positive_threshold,
                negative: config.sentiment_negative_threshold,
            })
            .with_batching(config.sentiment_batch_size, config.sentiment_concurrency))
    }

    #[must_use]
    pub fn with_thresholds(mut self, thresholds: SentimentThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Sets texts per backend call and the number of calls in flight.
    /// Zero is raised to one.
    #[must_use]
    pub fn with_batching(mut self, batch_size: usize, concurrency: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self.concurrency = concurrency.max(1);
        self
    }

    #[must_use]
    pub fn thresholds(&self) -> SentimentThresholds {
        self.thresholds
    }

    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Classifies a single text.
    ///
    /// # Errors
    ///
    /// Returns [`ClassificationError`] if the backend fails or returns a
    /// non-finite score.
    pub async fn classify(&self, text: &str) -> Result<SentimentResult, ClassificationError> {
        if text.trim().is_empty() {
            return Ok(SentimentResult::NEUTRAL);
        }
        let input = [truncate_chars(text, MAX_INPUT_CHARS).to_owned()];
        let predictions = self.backend.predict_batch(&input).await?;
        match predictions.as_slice() {
            [prediction] => self.finalize(*prediction),
            other => Err(ClassificationError::LengthMismatch {
                expected: 1,
                got: other.len(),
            }),
        }
    }

    /// Classifies every text, preserving order and length.
    ///
    /// Non-blank texts are sent in chunks of `batch_size`, with up to
    /// `concurrency` chunks in flight. All chunks are joined before
    /// returning; any failure fails the whole call.
    ///
    /// # Errors
    ///
    /// Returns the first [`ClassificationError`] raised by any chunk.
    pub async fn classify_all<S: AsRef<str>>(
        &self,
        texts: &[S],
    ) -> Result<Vec<SentimentResult>, ClassificationError> {
        let mut results = vec![SentimentResult::NEUTRAL; texts.len()];

        let pending: Vec<(usize, String)> = texts
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.as_ref().trim().is_empty())
            .map(|(i, t)| (i, truncate_chars(t.as_ref(), MAX_INPUT_CHARS).to_owned()))
            .collect();
        if pending.is_empty() {
            return Ok(results);
        }

        let chunk_count = pending.len().div_ceil(self.batch_size);
        tracing::debug!(
            backend = self.backend.name(),
            inputs = texts.len(),
            non_blank = pending.len(),
            chunks = chunk_count,
            "classifying texts"
        );

        let backend = self.backend.as_ref();
        let chunks: Vec<Vec<(usize, String)>> = pending
            .chunks(self.batch_size)
            .map(<[(usize, String)]>::to_vec)
            .collect();

        let predicted: Vec<Vec<(usize, Prediction)>> = stream::iter(chunks)
            .map(|chunk| predict_chunk(backend, chunk))
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        for (index, prediction) in predicted.into_iter().flatten() {
            results[index] = self.finalize(prediction)?;
        }
        Ok(results)
    }

    /// Classifies each comment's text and pairs the results with the comments.
    ///
    /// # Errors
    ///
    /// See [`SentimentClassifier::classify_all`].
    pub async fn classify_comments(
        &self,
        comments: Vec<Comment>,
    ) -> Result<Vec<ClassifiedComment>, ClassificationError> {
        let texts: Vec<&str> = comments.iter().map(|c| c.text.as_str()).collect();
        let results = self.classify_all(texts.as_slice()).await?;
        Ok(comments
            .into_iter()
            .zip(results)
            .map(|(comment, sentiment)| ClassifiedComment { comment, sentiment })
            .collect())
    }

    fn finalize(&self, prediction: Prediction) -> Result<SentimentResult, ClassificationError> {
        match prediction {
            Prediction::Score(raw) => {
                let score = round_score(checked(raw)?.clamp(-1.0, 1.0));
                Ok(SentimentResult {
                    label: self.thresholds.label_for(score),
                    score,
                })
            }
            Prediction::Label { label, confidence } => {
                let c = checked(confidence)?.clamp(0.0, 1.0);
                let score = match label {
                    SentimentLabel::Positive => c,
                    SentimentLabel::Negative => -c,
                    SentimentLabel::Neutral => 0.0,
                };
                Ok(SentimentResult {
                    label,
                    score: round_score(score),
                })
            }
        }
    }
}

async fn predict_chunk(
    backend: &dyn SentimentBackend,
    chunk: Vec<(usize, String)>,
) -> Result<Vec<(usize, Prediction)>, ClassificationError> {
    let (indices, inputs): (Vec<usize>, Vec<String>) = chunk.into_iter().unzip();
    let predictions = backend.predict_batch(&inputs).await?;
    if predictions.len() != inputs.len() {
        return Err(ClassificationError::LengthMismatch {
            expected: inputs.len(),
            got: predictions.len(),
        });
    }
    Ok(indices.into_iter().zip(predictions).collect())
}

fn checked(value: f32) -> Result<f32, ClassificationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ClassificationError::Backend(format!(
            "backend produced non-finite score {value}"
        )))
    }
}

fn round_score(score: f32) -> f32 {
    (score * 1000.0).round() / 1000.0
}

/// Longest prefix of `text` holding at most `max` characters.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

#[cfg(test)]
#[path = "classifier_test.rs"]
mod tests;
