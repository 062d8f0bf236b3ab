//! Capability interface over the video platform.

use async_trait::async_trait;
use ytsent_core::{Comment, Video};

use crate::error::PlatformError;

/// One page of top-level comments.
#[derive(Debug, Clone, Default)]
pub struct CommentPage {
    pub comments: Vec<Comment>,
    /// `None` when the platform reports no further pages.
    pub next_page_token: Option<String>,
}

/// The two platform operations the collector needs.
///
/// Implementations make exactly one billed request per call and do not
/// retry or cache.
#[async_trait]
pub trait VideoPlatform: Send + Sync {
    /// Runs a video search, returning hits in the platform's relevance order.
    async fn search_videos(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<Video>, PlatformError>;

    /// Fetches one page of top-level comment threads for `video_id`.
    async fn list_comment_threads(
        &self,
        video_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<CommentPage, PlatformError>;
}
