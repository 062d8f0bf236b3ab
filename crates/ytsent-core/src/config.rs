use std::env::VarError;
use std::fmt::Display;
use std::str::FromStr;

use chrono_tz::Tz;

use crate::app_config::{AppConfig, Environment, SentimentBackendKind};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Parses `var` (or `default` when unset) into `T`.
fn parse_var<T, F>(lookup: &F, var: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Result<String, VarError>,
{
    let raw = lookup(var).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a pure
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: &str| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: reason.to_string(),
    };

    let youtube_api_key = require("YOUTUBE_API_KEY")?;
    let env = parse_environment(&or_default("YTSENT_ENV", "development"));
    let bind_addr: SocketAddr = parse_var(&lookup, "YTSENT_BIND_ADDR", "0.0.0.0:5000")?;
    let log_level = or_default("YTSENT_LOG_LEVEL", "info");

    let youtube_base_url = or_default(
        "YTSENT_YOUTUBE_BASE_URL",
        "https://www.googleapis.com/youtube/v3",
    );
    let youtube_timeout_secs: u64 = parse_var(&lookup, "YTSENT_YOUTUBE_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("YTSENT_USER_AGENT", "ytsent/0.1 (comment-sentiment)");
    let relevance_language = or_default("YTSENT_RELEVANCE_LANGUAGE", "id");

    let quota_daily_limit: u32 = parse_var(&lookup, "YTSENT_QUOTA_DAILY_LIMIT", "10000")?;
    if quota_daily_limit == 0 {
        return Err(invalid("YTSENT_QUOTA_DAILY_LIMIT", "must be positive"));
    }
    let quota_search_cost: u32 = parse_var(&lookup, "YTSENT_QUOTA_SEARCH_COST", "100")?;
    let quota_comment_page_cost: u32 =
        parse_var(&lookup, "YTSENT_QUOTA_COMMENT_PAGE_COST", "1")?;
    let quota_reset_timezone: Tz =
        parse_var(&lookup, "YTSENT_QUOTA_RESET_TIMEZONE", "America/Los_Angeles")?;
    let offset_set = lookup("YTSENT_QUOTA_RESET_UTC_OFFSET_HOURS")
        .is_ok_and(|v| !v.trim().is_empty());
    let quota_reset_utc_offset_hours = if offset_set {
        let hours: i32 = parse_var(&lookup, "YTSENT_QUOTA_RESET_UTC_OFFSET_HOURS", "")?;
        if !(-12..=14).contains(&hours) {
            return Err(invalid(
                "YTSENT_QUOTA_RESET_UTC_OFFSET_HOURS",
                "must be between -12 and 14",
            ));
        }
        Some(hours)
    } else {
        None
    };

    let sentiment_backend = parse_backend(&or_default("YTSENT_SENTIMENT_BACKEND", "lexicon"))
        .ok_or_else(|| invalid("YTSENT_SENTIMENT_BACKEND", "expected 'lexicon' or 'inference'"))?;
    let sentiment_inference_url = lookup("YTSENT_SENTIMENT_INFERENCE_URL")
        .ok()
        .filter(|v| !v.trim().is_empty());
    if sentiment_backend == SentimentBackendKind::Inference && sentiment_inference_url.is_none() {
        return Err(ConfigError::MissingEnvVar(
            "YTSENT_SENTIMENT_INFERENCE_URL".to_string(),
        ));
    }

    let sentiment_positive_threshold: f32 =
        parse_var(&lookup, "YTSENT_SENTIMENT_POSITIVE_THRESHOLD", "0.1")?;
    let sentiment_negative_threshold: f32 =
        parse_var(&lookup, "YTSENT_SENTIMENT_NEGATIVE_THRESHOLD", "-0.1")?;
    if sentiment_negative_threshold >= sentiment_positive_threshold {
        return Err(invalid(
            "YTSENT_SENTIMENT_NEGATIVE_THRESHOLD",
            "must be below the positive threshold",
        ));
    }

    let sentiment_batch_size: usize = parse_var(&lookup, "YTSENT_SENTIMENT_BATCH_SIZE", "32")?;
    if sentiment_batch_size == 0 {
        return Err(invalid("YTSENT_SENTIMENT_BATCH_SIZE", "must be positive"));
    }
    let sentiment_concurrency: usize = parse_var(&lookup, "YTSENT_SENTIMENT_CONCURRENCY", "4")?;
    if sentiment_concurrency == 0 {
        return Err(invalid("YTSENT_SENTIMENT_CONCURRENCY", "must be positive"));
    }

    let data_dir = PathBuf::from(or_default("YTSENT_DATA_DIR", "./data"));

    Ok(AppConfig {
        youtube_api_key,
        env,
        bind_addr,
        log_level,
        youtube_base_url,
        youtube_timeout_secs,
        user_agent,
        relevance_language,
        quota_daily_limit,
        quota_search_cost,
        quota_comment_page_cost,
        quota_reset_timezone,
        quota_reset_utc_offset_hours,
        sentiment_backend,
        sentiment_inference_url,
        sentiment_positive_threshold,
        sentiment_negative_threshold,
        sentiment_batch_size,
        sentiment_concurrency,
        data_dir,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

fn parse_backend(s: &str) -> Option<SentimentBackendKind> {
    match s.trim().to_ascii_lowercase().as_str() {
        "lexicon" => Some(SentimentBackendKind::Lexicon),
        "inference" => Some(SentimentBackendKind::Inference),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
