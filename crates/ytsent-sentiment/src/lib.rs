//! Comment sentiment classification and aggregation.
//!
//! [`SentimentClassifier`] wraps a [`SentimentBackend`] (the in-process
//! lexicon or a remote inference server) and turns its raw predictions into
//! labelled, rounded scores. [`aggregate`] reduces classified comments to
//! per-label statistics, and [`analyze_video`] runs the whole fetch-to-statistics
//! pipeline for one video.

pub mod aggregate;
pub mod backend;
pub mod classifier;
pub mod error;
pub mod inference;
pub mod pipeline;
pub mod scorer;

pub use aggregate::{aggregate, aggregate_labels, percentages};
pub use backend::{Prediction, SentimentBackend};
pub use classifier::{SentimentClassifier, SentimentThresholds, MAX_INPUT_CHARS};
pub use error::{AnalysisError, ClassificationError};
pub use inference::{normalize_label, InferenceBackend};
pub use pipeline::{analyze_comments, analyze_video, CommentAnalysis, VideoAnalysis};
pub use scorer::{lexicon_score, LexiconBackend};
