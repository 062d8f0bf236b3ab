use std::path::PathBuf;

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use ytsent_core::ClassifiedComment;
use ytsent_export::{serialize, ExportFormat, SavedFiles};

use crate::middleware::RequestId;

use super::{map_serialization_error, map_storage_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct ExportRequest {
    #[serde(default)]
    pub comments: Vec<ClassifiedComment>,
    pub format: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct ExportData {
    pub filepath: PathBuf,
}

pub(super) async fn export(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ExportRequest>,
) -> Result<Json<ApiResponse<ExportData>>, ApiError> {
    if body.comments.is_empty() {
        return Err(ApiError::bad_request(req_id.0, "comments are required"));
    }

    let format: ExportFormat = body
        .format
        .as_deref()
        .unwrap_or("csv")
        .parse()
        .map_err(|e| map_serialization_error(req_id.0.clone(), &e))?;
    let bytes = serialize(&body.comments, format)
        .map_err(|e| map_serialization_error(req_id.0.clone(), &e))?;
    let filepath = state
        .store
        .save(&bytes, format)
        .await
        .map_err(|e| map_storage_error(req_id.0.clone(), &e))?;

    Ok(ApiResponse::new(req_id.0, ExportData { filepath }))
}

pub(super) async fn list_exports(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<SavedFiles>>, ApiError> {
    let saved = state
        .store
        .list_saved()
        .await
        .map_err(|e| map_storage_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::new(req_id.0, saved))
}
