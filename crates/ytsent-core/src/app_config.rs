use std::net::SocketAddr;
use std::path::PathBuf;

use chrono_tz::Tz;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Which sentiment backend the classifier wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentBackendKind {
    /// In-process lexicon scorer.
    Lexicon,
    /// Remote text-classification inference server.
    Inference,
}

#[derive(Clone)]
pub struct AppConfig {
    pub youtube_api_key: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub youtube_base_url: String,
    pub youtube_timeout_secs: u64,
    pub user_agent: String,
    pub relevance_language: String,
    pub quota_daily_limit: u32,
    pub quota_search_cost: u32,
    pub quota_comment_page_cost: u32,
    /// Zone whose local midnight resets the daily quota.
    pub quota_reset_timezone: Tz,
    /// Fixed offset that replaces `quota_reset_timezone` when set.
    pub quota_reset_utc_offset_hours: Option<i32>,
    pub sentiment_backend: SentimentBackendKind,
    pub sentiment_inference_url: Option<String>,
    pub sentiment_positive_threshold: f32,
    pub sentiment_negative_threshold: f32,
    pub sentiment_batch_size: usize,
    pub sentiment_concurrency: usize,
    pub data_dir: PathBuf,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("youtube_api_key", &"[redacted]")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("youtube_base_url", &self.youtube_base_url)
            .field("youtube_timeout_secs", &self.youtube_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("relevance_language", &self.relevance_language)
            .field("quota_daily_limit", &self.quota_daily_limit)
            .field("quota_search_cost", &self.quota_search_cost)
            .field("quota_comment_page_cost", &self.quota_comment_page_cost)
            .field("quota_reset_timezone", &self.quota_reset_timezone)
            .field(
                "quota_reset_utc_offset_hours",
                &self.quota_reset_utc_offset_hours,
            )
            .field("sentiment_backend", &self.sentiment_backend)
            .field("sentiment_inference_url", &self.sentiment_inference_url)
            .field(
                "sentiment_positive_threshold",
                &self.sentiment_positive_threshold,
            )
            .field(
                "sentiment_negative_threshold",
                &self.sentiment_negative_threshold,
            )
            .field("sentiment_batch_size", &self.sentiment_batch_size)
            .field("sentiment_concurrency", &self.sentiment_concurrency)
            .field("data_dir", &self.data_dir)
            .finish()
    }
}
