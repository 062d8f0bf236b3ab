//! HTTP client for a remote text-classification inference server.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use ytsent_core::SentimentLabel;

use crate::backend::{Prediction, SentimentBackend};
use crate::error::ClassificationError;

const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Backend that posts texts to `{url}/predict`.
///
/// The server answers with one list of `{label, score}` candidates per input;
/// the highest-scoring candidate wins.
pub struct InferenceBackend {
    client: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    inputs: &'a [String],
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f32,
}

impl InferenceBackend {
    /// # Errors
    ///
    /// Returns [`ClassificationError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, ClassificationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            url: format!("{}/predict", base_url.trim_end_matches('/')),
        })
    }
}

/// Maps model-specific label strings onto the three sentiment classes.
///
/// Handles plain (`positive`), Indonesian (`positif`) and star-rating
/// (`5 stars`) vocabularies; anything unrecognised is neutral.
#[must_use]
pub fn normalize_label(raw: &str) -> SentimentLabel {
    let lower = raw.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| lower.contains(w));
    if has(&["positive", "positif", "4 stars", "5 stars"]) {
        SentimentLabel::Positive
    } else if has(&["negative", "negatif", "1 star", "2 stars"]) {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

fn top_prediction(candidates: Vec<LabelScore>, index: usize) -> Result<Prediction, ClassificationError> {
    candidates
        .into_iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .map(|top| Prediction::Label {
            label: normalize_label(&top.label),
            confidence: top.score,
        })
        .ok_or_else(|| {
            ClassificationError::Backend(format!("no label candidates for input {index}"))
        })
}

#[async_trait]
impl SentimentBackend for InferenceBackend {
    async fn predict_batch(&self, texts: &[String]) -> Result<Vec<Prediction>, ClassificationError> {
        let response = self
            .client
            .post(&self.url)
            .json(&PredictRequest { inputs: texts })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassificationError::Backend(format!(
                "inference server returned status {status}: {body}"
            )));
        }

        let outputs: Vec<Vec<LabelScore>> = response.json().await.map_err(|e| {
            ClassificationError::Backend(format!("inference response parse error: {e}"))
        })?;

        if outputs.len() != texts.len() {
            return Err(ClassificationError::LengthMismatch {
                expected: texts.len(),
                got: outputs.len(),
            });
        }

        outputs
            .into_iter()
            .enumerate()
            .map(|(i, candidates)| top_prediction(candidates, i))
            .collect()
    }

    fn name(&self) -> &'static str {
        "inference"
    }
}
