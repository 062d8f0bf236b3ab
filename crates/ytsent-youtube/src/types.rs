//! YouTube Data API v3 response types.
//!
//! Only the fields the collector reads are modeled; everything else in the
//! payload is ignored by serde.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use ytsent_core::{Comment, Video};

// ---------------------------------------------------------------------------
// search.list
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchResult>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResult {
    pub id: ResourceId,
    pub snippet: SearchSnippet,
}

/// `id` object of a search result. `video_id` is absent for channel and
/// playlist hits.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSnippet {
    pub published_at: DateTime<Utc>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub channel_title: String,
}

impl SearchResult {
    /// Converts a hit into a [`Video`], or `None` for non-video resources.
    #[must_use]
    pub fn into_video(self) -> Option<Video> {
        let video_id = self.id.video_id?;
        Some(Video {
            video_id,
            title: self.snippet.title,
            channel: self.snippet.channel_title,
            published_at: self.snippet.published_at,
            description: self.snippet.description,
        })
    }
}

// ---------------------------------------------------------------------------
// commentThreads.list
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThreadListResponse {
    #[serde(default)]
    pub items: Vec<CommentThread>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommentThread {
    pub id: String,
    pub snippet: CommentThreadSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThreadSnippet {
    #[serde(default)]
    pub video_id: Option<String>,
    pub top_level_comment: TopLevelComment,
}

#[derive(Debug, Deserialize)]
pub struct TopLevelComment {
    pub id: String,
    pub snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentSnippet {
    #[serde(default)]
    pub text_display: String,
    #[serde(default)]
    pub text_original: Option<String>,
    #[serde(default)]
    pub author_display_name: String,
    #[serde(default)]
    pub like_count: u64,
    pub published_at: DateTime<Utc>,
}

impl CommentThread {
    /// Converts the thread's top-level comment into a [`Comment`] owned by
    /// `video_id`.
    #[must_use]
    pub fn into_comment(self, video_id: &str) -> Comment {
        let top = self.snippet.top_level_comment;
        let text = if top.snippet.text_display.is_empty() {
            top.snippet.text_original.unwrap_or_default()
        } else {
            top.snippet.text_display
        };
        Comment {
            comment_id: top.id,
            video_id: self.snippet.video_id.unwrap_or_else(|| video_id.to_owned()),
            author: top.snippet.author_display_name,
            text,
            likes: top.snippet.like_count,
            published_at: top.snippet.published_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Error envelope
// ---------------------------------------------------------------------------

/// `{"error": {"code": 403, "message": "...", "errors": [{"reason": "..."}]}}`
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
}

impl ErrorBody {
    /// First machine-readable reason, e.g. `commentsDisabled` or `quotaExceeded`.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.errors.iter().find_map(|e| e.reason.as_deref())
    }
}
