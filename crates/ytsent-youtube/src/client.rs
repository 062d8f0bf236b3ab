//! HTTP client for the YouTube Data API v3.
//!
//! Wraps `reqwest` with API key handling, typed response deserialization and
//! translation of the API's JSON error envelope into [`PlatformError`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use ytsent_core::{AppConfig, Video};

use crate::error::PlatformError;
use crate::platform::{CommentPage, VideoPlatform};
use crate::types::{CommentThreadListResponse, ErrorEnvelope, SearchListResponse, SearchResult};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";
const DEFAULT_USER_AGENT: &str = "ytsent/0.1 (comment-sentiment)";

/// Client for the YouTube Data API.
///
/// Use [`YouTubeClient::new`] for production or
/// [`YouTubeClient::with_base_url`] to point at a mock server in tests.
pub struct YouTubeClient {
    client: Client,
    api_key: String,
    base_url: Url,
    relevance_language: Option<String>,
}

impl YouTubeClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, PlatformError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`PlatformError::InvalidBaseUrl`] if `base_url` does
    /// not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, PlatformError> {
        Self::build(api_key, timeout_secs, base_url, DEFAULT_USER_AGENT)
    }

    /// Creates a client from application configuration.
    ///
    /// # Errors
    ///
    /// See [`YouTubeClient::with_base_url`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, PlatformError> {
        let client = Self::build(
            &config.youtube_api_key,
            config.youtube_timeout_secs,
            &config.youtube_base_url,
            &config.user_agent,
        )?;
        Ok(client.with_relevance_language(&config.relevance_language))
    }

    /// Biases search results toward `language` (ISO 639-1, e.g. `"id"`).
    #[must_use]
    pub fn with_relevance_language(mut self, language: &str) -> Self {
        let language = language.trim();
        self.relevance_language = (!language.is_empty()).then(|| language.to_owned());
        self
    }

    fn build(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
        user_agent: &str,
    ) -> Result<Self, PlatformError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so `Url::join` appends the resource name
        // instead of replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| PlatformError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            relevance_language: None,
        })
    }

    /// Builds `<base>/<resource>?key=...&<params>` with percent-encoded values.
    fn build_url(&self, resource: &str, params: &[(&str, &str)]) -> Result<Url, PlatformError> {
        let mut url = self
            .base_url
            .join(resource)
            .map_err(|e| PlatformError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("key", &self.api_key);
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Sends a GET request and parses a 2xx body into `T`.
    ///
    /// Non-2xx responses are decoded from the API's error envelope; a 403
    /// with reason `commentsDisabled` becomes
    /// [`PlatformError::CommentsDisabled`] when `video_id` is given.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        context: &str,
        video_id: Option<&str>,
    ) -> Result<T, PlatformError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let envelope = serde_json::from_str::<ErrorEnvelope>(&body).ok();
            let reason = envelope
                .as_ref()
                .and_then(|e| e.error.reason())
                .map(str::to_owned);

            if status == reqwest::StatusCode::FORBIDDEN && reason.as_deref() == Some("commentsDisabled")
            {
                if let Some(video_id) = video_id {
                    return Err(PlatformError::CommentsDisabled {
                        video_id: video_id.to_owned(),
                    });
                }
            }

            let message = envelope
                .map(|e| e.error.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("{context} failed with HTTP {status}"));
            tracing::warn!(
                status = status.as_u16(),
                reason = reason.as_deref().unwrap_or("unknown"),
                context,
                "YouTube API returned an error"
            );
            return Err(PlatformError::Api {
                status: status.as_u16(),
                reason,
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| PlatformError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }
}

#[async_trait]
impl VideoPlatform for YouTubeClient {
    async fn search_videos(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<Video>, PlatformError> {
        let max_results = max_results.to_string();
        let mut params = vec![
            ("part", "snippet"),
            ("q", query),
            ("type", "video"),
            ("order", "relevance"),
            ("maxResults", max_results.as_str()),
        ];
        if let Some(language) = &self.relevance_language {
            params.push(("relevanceLanguage", language.as_str()));
        }

        let url = self.build_url("search", &params)?;
        let response: SearchListResponse = self
            .get_json(url, &format!("search(q={query})"), None)
            .await?;

        Ok(response
            .items
            .into_iter()
            .filter_map(SearchResult::into_video)
            .collect())
    }

    async fn list_comment_threads(
        &self,
        video_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<CommentPage, PlatformError> {
        let page_size = page_size.to_string();
        let mut params = vec![
            ("part", "snippet"),
            ("videoId", video_id),
            ("maxResults", page_size.as_str()),
            ("order", "relevance"),
            ("textFormat", "plainText"),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let url = self.build_url("commentThreads", &params)?;
        let response: CommentThreadListResponse = self
            .get_json(
                url,
                &format!("commentThreads(videoId={video_id})"),
                Some(video_id),
            )
            .await?;

        Ok(CommentPage {
            comments: response
                .items
                .into_iter()
                .map(|thread| thread.into_comment(video_id))
                .collect(),
            next_page_token: response.next_page_token.filter(|t| !t.is_empty()),
        })
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
