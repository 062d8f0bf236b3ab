//! Sentiment analysis handlers.

use std::path::PathBuf;

use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ytsent_core::{ClassifiedComment, Comment, Statistics};
use ytsent_export::serialize_report;

use crate::middleware::RequestId;

use super::{
    map_analysis_error, map_classification_error, map_serialization_error, map_storage_error,
    ApiError, ApiResponse, AppState, QuotaData,
};

const DEFAULT_MAX_COMMENTS: usize = 100;
const DEFAULT_REPORT_QUERY: &str = "politik";

#[derive(Debug, Deserialize)]
pub(super) struct AnalyzeRequest {
    #[serde(default)]
    pub comments: Vec<SuppliedComment>,
}

/// A client-supplied comment. Only `text` matters for classification; any
/// metadata left out is filled with empty values, and a missing
/// `published_at` becomes the time the request was received.
#[derive(Debug, Deserialize)]
pub(super) struct SuppliedComment {
    #[serde(default)]
    pub comment_id: String,
    #[serde(default)]
    pub video_id: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub likes: u64,
    pub published_at: Option<DateTime<Utc>>,
}

impl SuppliedComment {
    fn into_comment(self, received_at: DateTime<Utc>) -> Comment {
        Comment {
            comment_id: self.comment_id,
            video_id: self.video_id,
            author: self.author,
            text: self.text,
            likes: self.likes,
            published_at: self.published_at.unwrap_or(received_at),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct AnalyzeVideoRequest {
    #[serde(default)]
    pub video_id: String,
    pub max_comments: Option<usize>,
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct AnalyzeData {
    pub comments: Vec<ClassifiedComment>,
    pub statistics: Statistics,
}

#[derive(Debug, Serialize)]
pub(super) struct AnalyzeVideoData {
    pub comments: Vec<ClassifiedComment>,
    pub statistics: Statistics,
    pub truncated: bool,
    pub saved_to: PathBuf,
    pub quota: QuotaData,
}

/// Classifies comments supplied by the client.
pub(super) async fn analyze(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<AnalyzeRequest>,
) -> Result<Json<ApiResponse<AnalyzeData>>, ApiError> {
    if body.comments.is_empty() {
        return Err(ApiError::bad_request(req_id.0, "comments are required"));
    }

    let received_at = Utc::now();
    let comments = body
        .comments
        .into_iter()
        .map(|c| c.into_comment(received_at))
        .collect();
    let analysis = ytsent_sentiment::analyze_comments(&state.classifier, comments)
        .await
        .map_err(|e| map_classification_error(req_id.0.clone(), &e))?;

    Ok(ApiResponse::new(
        req_id.0,
        AnalyzeData {
            comments: analysis.comments,
            statistics: analysis.statistics,
        },
    ))
}

/// Fetches, classifies and aggregates one video's comments, then saves an
/// analysis report.
pub(super) async fn analyze_video(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<AnalyzeVideoRequest>,
) -> Result<Json<ApiResponse<AnalyzeVideoData>>, ApiError> {
    let analysis = ytsent_sentiment::analyze_video(
        &state.collector,
        &state.classifier,
        &body.video_id,
        body.max_comments.unwrap_or(DEFAULT_MAX_COMMENTS),
    )
    .await
    .map_err(|e| map_analysis_error(req_id.0.clone(), e))?;

    if analysis.comments.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "not_found",
            format!("no comments found for video {}", analysis.video_id),
        ));
    }

    let query = body
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .unwrap_or(DEFAULT_REPORT_QUERY);
    let report = serialize_report(query, Utc::now(), &analysis.statistics, &analysis.comments)
        .map_err(|e| map_serialization_error(req_id.0.clone(), &e))?;
    let saved_to = state
        .store
        .save_report(&report)
        .await
        .map_err(|e| map_storage_error(req_id.0.clone(), &e))?;

    Ok(ApiResponse::new(
        req_id.0,
        AnalyzeVideoData {
            comments: analysis.comments,
            statistics: analysis.statistics,
            truncated: analysis.truncated,
            saved_to,
            quota: analysis.quota.into(),
        },
    ))
}
