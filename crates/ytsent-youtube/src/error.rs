use chrono::{DateTime, Utc};
use thiserror::Error;

/// A reservation was rejected because it would push the ledger past its
/// daily limit. No units were charged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "daily quota exceeded: {requested} units requested with {used}/{limit} used (resets at {reset_at})"
)]
pub struct QuotaExceeded {
    pub requested: u32,
    pub used: u32,
    pub limit: u32,
    pub reset_at: DateTime<Utc>,
}

/// Errors raised by a [`crate::VideoPlatform`] implementation.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The video does not allow comment listing.
    #[error("comments are disabled for video {video_id}")]
    CommentsDisabled { video_id: String },

    /// The API answered with a non-2xx status.
    #[error("YouTube API error (status {status}): {message}")]
    Api {
        status: u16,
        reason: Option<String>,
        message: String,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{base_url}': {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

impl PlatformError {
    /// `true` when the platform refused the call because the API key's daily
    /// quota is spent.
    #[must_use]
    pub fn is_quota_exhausted(&self) -> bool {
        matches!(
            self,
            PlatformError::Api { status: 403, reason: Some(reason), .. }
                if reason == "quotaExceeded" || reason == "dailyLimitExceeded"
        )
    }
}

/// Errors returned by [`crate::Collector`].
#[derive(Debug, Error)]
pub enum CollectorError {
    /// The local daily budget cannot cover the call. Nothing was charged and
    /// the platform was not contacted.
    #[error(transparent)]
    QuotaExceeded(#[from] QuotaExceeded),

    /// The target video rejects comment listing. Not retryable.
    #[error("comments are disabled for video {video_id}")]
    CommentsDisabled { video_id: String },

    /// The platform or the network failed.
    #[error("upstream error: {message}")]
    Upstream {
        status: Option<u16>,
        message: String,
        retryable: bool,
    },

    /// Arguments were rejected before any quota was touched.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl CollectorError {
    /// Returns `true` for failures a caller may reasonably retry with backoff:
    /// timeouts, connection failures, HTTP 429 and 5xx. The collector never
    /// retries on its own.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            CollectorError::Upstream { retryable, .. } => *retryable,
            CollectorError::QuotaExceeded(_)
            | CollectorError::CommentsDisabled { .. }
            | CollectorError::InvalidRequest(_) => false,
        }
    }
}

impl From<PlatformError> for CollectorError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::CommentsDisabled { video_id } => {
                CollectorError::CommentsDisabled { video_id }
            }
            PlatformError::Http(e) => {
                let status = e.status().map(|s| s.as_u16());
                let retryable = e.is_timeout()
                    || e.is_connect()
                    || e.status().is_some_and(|s| s.is_server_error());
                CollectorError::Upstream {
                    status,
                    message: e.to_string(),
                    retryable,
                }
            }
            PlatformError::Api {
                status, message, ..
            } => CollectorError::Upstream {
                status: Some(status),
                message,
                retryable: status == 429 || status >= 500,
            },
            other @ (PlatformError::Deserialize { .. } | PlatformError::InvalidBaseUrl { .. }) => {
                CollectorError::Upstream {
                    status: None,
                    message: other.to_string(),
                    retryable: false,
                }
            }
        }
    }
}
