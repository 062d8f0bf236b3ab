mod analysis;
mod collect;
mod export;

use std::sync::Arc;

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use ytsent_core::QuotaState;
use ytsent_export::{ExportStore, SerializationError, StorageError};
use ytsent_sentiment::{AnalysisError, ClassificationError, SentimentClassifier};
use ytsent_youtube::{Collector, CollectorError};

use crate::middleware::{request_id, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub collector: Collector,
    pub classifier: Arc<SentimentClassifier>,
    pub store: ExportStore,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
}

/// Quota snapshot as reported to clients.
#[derive(Debug, Serialize)]
pub(super) struct QuotaData {
    pub used: u32,
    pub daily_limit: u32,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

impl From<QuotaState> for QuotaData {
    fn from(state: QuotaState) -> Self {
        Self {
            used: state.used,
            daily_limit: state.daily_limit,
            remaining: state.remaining(),
            reset_at: state.reset_at,
        }
    }
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(request_id: String, data: T) -> Json<Self> {
        Json(Self {
            data,
            meta: ResponseMeta::new(request_id),
        })
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }

    pub(super) fn bad_request(request_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(request_id, "bad_request", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" => StatusCode::BAD_REQUEST,
            "quota_exceeded" => StatusCode::TOO_MANY_REQUESTS,
            "comments_disabled" => StatusCode::FORBIDDEN,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_collector_error(request_id: String, error: CollectorError) -> ApiError {
    let code = match &error {
        CollectorError::InvalidRequest(_) => "bad_request",
        CollectorError::QuotaExceeded(_) => "quota_exceeded",
        CollectorError::CommentsDisabled { .. } => "comments_disabled",
        CollectorError::Upstream { .. } => {
            tracing::error!(error = %error, retryable = error.is_retryable(), "platform call failed");
            "upstream_error"
        }
    };
    ApiError::new(request_id, code, error.to_string())
}

pub(super) fn map_classification_error(request_id: String, error: &ClassificationError) -> ApiError {
    tracing::error!(error = %error, "sentiment classification failed");
    ApiError::new(request_id, "classification_error", error.to_string())
}

pub(super) fn map_analysis_error(request_id: String, error: AnalysisError) -> ApiError {
    match error {
        AnalysisError::Collector(e) => map_collector_error(request_id, e),
        AnalysisError::Classification(e) => map_classification_error(request_id, &e),
    }
}

pub(super) fn map_serialization_error(request_id: String, error: &SerializationError) -> ApiError {
    match error {
        SerializationError::UnsupportedFormat(_) => ApiError::bad_request(request_id, error.to_string()),
        SerializationError::Csv(_) | SerializationError::Json(_) => {
            tracing::error!(error = %error, "export serialization failed");
            ApiError::new(request_id, "internal_error", "export serialization failed")
        }
    }
}

pub(super) fn map_storage_error(request_id: String, error: &StorageError) -> ApiError {
    tracing::error!(error = %error, "export storage failed");
    ApiError::new(request_id, "internal_error", "failed to save export file")
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/search", post(collect::search))
        .route("/api/comments", post(collect::comments))
        .route("/api/quota", get(collect::quota))
        .route("/api/analyze", post(analysis::analyze))
        .route("/api/analyze-video", post(analysis::analyze_video))
        .route("/api/export", post(export::export))
        .route("/api/exports", get(export::list_exports))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    ApiResponse::new(req_id.0, HealthData { status: "ok" })
}
