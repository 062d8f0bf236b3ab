//! Collect → classify → aggregate orchestration.

use serde::Serialize;
use ytsent_core::{ClassifiedComment, Comment, QuotaState, Statistics};
use ytsent_youtube::Collector;

use crate::aggregate::aggregate;
use crate::classifier::SentimentClassifier;
use crate::error::{AnalysisError, ClassificationError};

/// Classified comments with their statistics.
#[derive(Debug, Clone, Serialize)]
pub struct CommentAnalysis {
    pub comments: Vec<ClassifiedComment>,
    pub statistics: Statistics,
}

/// Result of analysing one video's comments.
#[derive(Debug, Clone, Serialize)]
pub struct VideoAnalysis {
    pub video_id: String,
    pub comments: Vec<ClassifiedComment>,
    pub statistics: Statistics,
    /// `true` when collection stopped early because the daily quota ran out.
    pub truncated: bool,
    /// Ledger state after collection.
    pub quota: QuotaState,
}

/// Classifies already-fetched comments and aggregates the results.
///
/// # Errors
///
/// Returns [`ClassificationError`] if the classifier fails.
pub async fn analyze_comments(
    classifier: &SentimentClassifier,
    comments: Vec<Comment>,
) -> Result<CommentAnalysis, ClassificationError> {
    let comments = classifier.classify_comments(comments).await?;
    let statistics = aggregate(&comments);
    Ok(CommentAnalysis {
        comments,
        statistics,
    })
}

/// Run the full pipeline for one video.
///
/// 1. Fetch up to `max_comments` comments under the quota budget.
/// 2. Classify every comment.
/// 3. Aggregate label statistics.
///
/// A truncated fetch is still analysed; the flag is passed through.
///
/// # Errors
///
/// Returns [`AnalysisError::Collector`] if collection fails and
/// [`AnalysisError::Classification`] if classification fails. Quota spent on
/// pages that were received stays spent in the latter case.
pub async fn analyze_video(
    collector: &Collector,
    classifier: &SentimentClassifier,
    video_id: &str,
    max_comments: usize,
) -> Result<VideoAnalysis, AnalysisError> {
    let batch = collector.fetch_comments(video_id, max_comments).await?;
    let fetched = batch.comments.len();

    let CommentAnalysis {
        comments,
        statistics,
    } = analyze_comments(classifier, batch.comments).await?;

    tracing::info!(
        video_id,
        comments = fetched,
        pages = batch.pages,
        truncated = batch.truncated,
        backend = classifier.backend_name(),
        positive = statistics.positive,
        neutral = statistics.neutral,
        negative = statistics.negative,
        "video analysis complete"
    );

    Ok(VideoAnalysis {
        video_id: video_id.to_owned(),
        comments,
        statistics,
        truncated: batch.truncated,
        quota: collector.quota(),
    })
}
