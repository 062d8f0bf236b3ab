//! CSV and JSON encodings of classified comments.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use ytsent_core::{ClassifiedComment, SentimentLabel, Statistics};

use crate::error::SerializationError;

/// Column order of the CSV export; JSON objects use the same keys.
pub const EXPORT_COLUMNS: [&str; 6] = [
    "author",
    "text",
    "likes",
    "published_at",
    "sentiment",
    "sentiment_score",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// File extension without the dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = SerializationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(SerializationError::UnsupportedFormat(s.to_owned())),
        }
    }
}

/// One exported row.
#[derive(Serialize)]
struct ExportRecord<'a> {
    author: &'a str,
    text: &'a str,
    likes: u64,
    published_at: String,
    sentiment: SentimentLabel,
    sentiment_score: f32,
}

impl<'a> From<&'a ClassifiedComment> for ExportRecord<'a> {
    fn from(item: &'a ClassifiedComment) -> Self {
        Self {
            author: &item.comment.author,
            text: &item.comment.text,
            likes: item.comment.likes,
            published_at: rfc3339(item.comment.published_at),
            sentiment: item.sentiment.label,
            sentiment_score: item.sentiment.score,
        }
    }
}

fn rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Encodes classified comments in input order.
///
/// Empty input yields a header-only CSV or `[]`.
///
/// # Errors
///
/// Returns [`SerializationError::Csv`] or [`SerializationError::Json`] if
/// encoding fails.
pub fn serialize(
    comments: &[ClassifiedComment],
    format: ExportFormat,
) -> Result<Vec<u8>, SerializationError> {
    match format {
        ExportFormat::Csv => to_csv(comments),
        ExportFormat::Json => {
            let records: Vec<ExportRecord<'_>> = comments.iter().map(ExportRecord::from).collect();
            Ok(serde_json::to_vec_pretty(&records)?)
        }
    }
}

fn to_csv(comments: &[ClassifiedComment]) -> Result<Vec<u8>, SerializationError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(EXPORT_COLUMNS)?;
    for item in comments {
        writer.serialize(ExportRecord::from(item))?;
    }

    writer
        .into_inner()
        .map_err(|e| SerializationError::Csv(e.into_error().into()))
}

#[derive(Serialize)]
struct AnalysisReport<'a> {
    query: &'a str,
    timestamp: String,
    statistics: &'a Statistics,
    comments: &'a [ClassifiedComment],
}

/// Encodes a full analysis report as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`SerializationError::Json`] if encoding fails.
pub fn serialize_report(
    query: &str,
    generated_at: DateTime<Utc>,
    statistics: &Statistics,
    comments: &[ClassifiedComment],
) -> Result<Vec<u8>, SerializationError> {
    let report = AnalysisReport {
        query,
        timestamp: rfc3339(generated_at),
        statistics,
        comments,
    };
    Ok(serde_json::to_vec_pretty(&report)?)
}
