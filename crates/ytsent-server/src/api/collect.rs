//! Search, comment listing and quota handlers.

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use ytsent_core::{Comment, Video};

use crate::middleware::RequestId;

use super::{map_collector_error, ApiError, ApiResponse, AppState, QuotaData};

const DEFAULT_SEARCH_RESULTS: u32 = 10;
const DEFAULT_COMMENT_RESULTS: usize = 100;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(super) struct SearchRequest {
    #[serde(default)]
    pub query: String,
    pub max_results: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CommentsRequest {
    #[serde(default)]
    pub video_id: String,
    pub max_results: Option<usize>,
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(super) struct SearchData {
    pub videos: Vec<Video>,
    pub quota: QuotaData,
}

#[derive(Debug, Serialize)]
pub(super) struct CommentsData {
    pub comments: Vec<Comment>,
    pub count: usize,
    pub truncated: bool,
    pub quota: QuotaData,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub(super) async fn search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<SearchRequest>,
) -> Result<Json<ApiResponse<SearchData>>, ApiError> {
    let videos = state
        .collector
        .search(
            &body.query,
            body.max_results.unwrap_or(DEFAULT_SEARCH_RESULTS),
        )
        .await
        .map_err(|e| map_collector_error(req_id.0.clone(), e))?;

    Ok(ApiResponse::new(
        req_id.0,
        SearchData {
            videos,
            quota: state.collector.quota().into(),
        },
    ))
}

pub(super) async fn comments(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CommentsRequest>,
) -> Result<Json<ApiResponse<CommentsData>>, ApiError> {
    let batch = state
        .collector
        .fetch_comments(
            &body.video_id,
            body.max_results.unwrap_or(DEFAULT_COMMENT_RESULTS),
        )
        .await
        .map_err(|e| map_collector_error(req_id.0.clone(), e))?;

    Ok(ApiResponse::new(
        req_id.0,
        CommentsData {
            count: batch.comments.len(),
            comments: batch.comments,
            truncated: batch.truncated,
            quota: state.collector.quota().into(),
        },
    ))
}

pub(super) async fn quota(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<QuotaData>> {
    ApiResponse::new(req_id.0, state.collector.quota().into())
}
