//! Quota-metered search and comment collection.

use std::sync::Arc;

use ytsent_core::{Comment, QuotaState, Video};

use crate::error::CollectorError;
use crate::platform::VideoPlatform;
use crate::quota::QuotaLedger;

/// Largest `maxResults` the search endpoint accepts.
pub const MAX_SEARCH_RESULTS: u32 = 50;

/// Largest page the comment-listing endpoint returns.
pub const MAX_COMMENT_PAGE_SIZE: u32 = 100;

/// Maximum number of pages to fetch for one video. Stops cycling page tokens.
pub(crate) const MAX_PAGES: u32 = 200;

/// Comments gathered for one video.
#[derive(Debug, Clone, Default)]
pub struct CommentBatch {
    /// In the platform's order, never more than requested.
    pub comments: Vec<Comment>,
    /// `true` when pagination stopped early because the daily quota ran out
    /// or the page limit was reached.
    pub truncated: bool,
    /// Pages received (and billed).
    pub pages: u32,
}

/// Runs platform calls against a shared [`QuotaLedger`].
///
/// Every call is billed: there is no result cache, so two identical searches
/// cost twice.
#[derive(Clone)]
pub struct Collector {
    platform: Arc<dyn VideoPlatform>,
    ledger: Arc<QuotaLedger>,
}

impl Collector {
    #[must_use]
    pub fn new(platform: Arc<dyn VideoPlatform>, ledger: Arc<QuotaLedger>) -> Self {
        Self { platform, ledger }
    }

    #[must_use]
    pub fn ledger(&self) -> &Arc<QuotaLedger> {
        &self.ledger
    }

    /// Current quota snapshot, for reporting alongside results.
    #[must_use]
    pub fn quota(&self) -> QuotaState {
        self.ledger.current_state()
    }

    /// Searches for videos matching `query`.
    ///
    /// Reserves the search cost once per call. The charge is refunded if the
    /// platform call fails or the future is dropped before a response arrives.
    ///
    /// # Errors
    ///
    /// - [`CollectorError::InvalidRequest`] for a blank query or `max_results`
    ///   outside `1..=50`.
    /// - [`CollectorError::QuotaExceeded`] if the budget cannot cover a
    ///   search (the platform is not contacted), or the platform itself
    ///   reports the quota spent (the ledger is then closed for the day).
    /// - [`CollectorError::Upstream`] on network or API failure.
    pub async fn search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<Video>, CollectorError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CollectorError::InvalidRequest(
                "query must not be empty".to_owned(),
            ));
        }
        if max_results == 0 || max_results > MAX_SEARCH_RESULTS {
            return Err(CollectorError::InvalidRequest(format!(
                "max_results must be between 1 and {MAX_SEARCH_RESULTS}, got {max_results}"
            )));
        }

        let cost = self.ledger.costs().search;
        let hold = self.ledger.hold(cost)?;
        let videos = match self.platform.search_videos(query, max_results).await {
            Ok(videos) => videos,
            Err(err) if err.is_quota_exhausted() => {
                drop(hold);
                return Err(self.ledger.exhaust(cost).into());
            }
            Err(err) => return Err(err.into()),
        };
        hold.commit();

        tracing::info!(query, count = videos.len(), "video search complete");
        Ok(videos)
    }

    /// Fetches up to `max_comments` top-level comments for `video_id`.
    ///
    /// Each page reserves the per-page cost before it is requested and is
    /// billed only once its response has been received. Pagination stops when
    /// `max_comments` are collected, the platform reports no further pages,
    /// or the quota runs out.
    ///
    /// A quota rejection after at least one page has been received is a
    /// partial success: the comments gathered so far are returned with
    /// `truncated` set. This covers both the local ledger running out and
    /// the platform reporting the key's quota spent. A rejection before the
    /// first page is an error. Reaching [`MAX_PAGES`] also returns a
    /// truncated batch.
    ///
    /// # Errors
    ///
    /// - [`CollectorError::InvalidRequest`] for a blank id or `max_comments == 0`.
    /// - [`CollectorError::QuotaExceeded`] if not even the first page fits.
    /// - [`CollectorError::CommentsDisabled`] if the video disallows comments.
    /// - [`CollectorError::Upstream`] on network or API failure.
    pub async fn fetch_comments(
        &self,
        video_id: &str,
        max_comments: usize,
    ) -> Result<CommentBatch, CollectorError> {
        let video_id = video_id.trim();
        if video_id.is_empty() {
            return Err(CollectorError::InvalidRequest(
                "video_id must not be empty".to_owned(),
            ));
        }
        if max_comments == 0 {
            return Err(CollectorError::InvalidRequest(
                "max_comments must be positive".to_owned(),
            ));
        }

        let page_cost = self.ledger.costs().comment_page;
        let mut comments: Vec<Comment> = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0u32;

        loop {
            if pages >= MAX_PAGES {
                tracing::warn!(
                    video_id,
                    collected = comments.len(),
                    requested = max_comments,
                    pages,
                    "pagination limit reached; returning partial comments"
                );
                return Ok(CommentBatch {
                    comments,
                    truncated: true,
                    pages,
                });
            }

            let hold = match self.ledger.hold(page_cost) {
                Ok(hold) => hold,
                Err(err) if pages > 0 => {
                    return Ok(partial(video_id, comments, pages, max_comments, &err));
                }
                Err(err) => return Err(err.into()),
            };

            let remaining = max_comments - comments.len();
            let page = match self
                .platform
                .list_comment_threads(video_id, page_size(remaining), page_token.as_deref())
                .await
            {
                Ok(page) => page,
                Err(err) if err.is_quota_exhausted() => {
                    drop(hold);
                    let rejection = self.ledger.exhaust(page_cost);
                    if pages > 0 {
                        return Ok(partial(video_id, comments, pages, max_comments, &rejection));
                    }
                    return Err(rejection.into());
                }
                Err(err) => return Err(err.into()),
            };
            hold.commit();
            pages += 1;

            let received = page.comments.len();
            comments.extend(page.comments.into_iter().take(remaining));
            tracing::debug!(
                video_id,
                page = pages,
                received,
                collected = comments.len(),
                "fetched comment page"
            );

            if comments.len() >= max_comments {
                break;
            }
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::info!(
            video_id,
            count = comments.len(),
            pages,
            "comment collection complete"
        );
        Ok(CommentBatch {
            comments,
            truncated: false,
            pages,
        })
    }
}

fn partial(
    video_id: &str,
    comments: Vec<Comment>,
    pages: u32,
    requested: usize,
    cause: &dyn std::fmt::Display,
) -> CommentBatch {
    tracing::warn!(
        video_id,
        collected = comments.len(),
        requested,
        pages,
        error = %cause,
        "quota exhausted mid-pagination; returning partial comments"
    );
    CommentBatch {
        comments,
        truncated: true,
        pages,
    }
}

fn page_size(remaining: usize) -> u32 {
    u32::try_from(remaining).map_or(MAX_COMMENT_PAGE_SIZE, |r| r.min(MAX_COMMENT_PAGE_SIZE))
}
