//! Shared domain types and configuration for the ytsent workspace.

pub mod app_config;
pub mod config;
pub mod types;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, SentimentBackendKind};
pub use config::{load_app_config, load_app_config_from_env};
pub use types::{
    ClassifiedComment, Comment, QuotaState, SentimentLabel, SentimentResult, Statistics, Video,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
