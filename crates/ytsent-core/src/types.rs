//! Domain records shared by the collector, classifier and exporter.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A video returned by a platform search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub video_id: String,
    pub title: String,
    pub channel: String,
    pub published_at: DateTime<Utc>,
    pub description: String,
}

/// A top-level comment on a video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Unique within the owning video.
    pub comment_id: String,
    pub video_id: String,
    pub author: String,
    pub text: String,
    pub likes: u64,
    pub published_at: DateTime<Utc>,
}

/// Sentiment category assigned to a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// All labels in reporting order.
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Neutral,
        SentimentLabel::Negative,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(SentimentLabel::Positive),
            "neutral" => Ok(SentimentLabel::Neutral),
            "negative" => Ok(SentimentLabel::Negative),
            other => Err(format!("unknown sentiment label: {other}")),
        }
    }
}

/// Classifier output for one text.
///
/// Serialized with the field names the API and export surfaces use
/// (`sentiment`, `sentiment_score`) so it can be flattened into a
/// [`ClassifiedComment`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    #[serde(rename = "sentiment")]
    pub label: SentimentLabel,
    /// Signed score in `[-1.0, 1.0]`.
    #[serde(rename = "sentiment_score")]
    pub score: f32,
}

impl SentimentResult {
    /// Result for blank or degenerate input.
    pub const NEUTRAL: SentimentResult = SentimentResult {
        label: SentimentLabel::Neutral,
        score: 0.0,
    };
}

/// A comment paired with its sentiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedComment {
    #[serde(flatten)]
    pub comment: Comment,
    #[serde(flatten)]
    pub sentiment: SentimentResult,
}

/// Per-label tallies and percentages for a set of classified comments.
///
/// Percentages carry one decimal place and sum to exactly `100.0` whenever
/// `total > 0`. They are exact decimals, serialized as JSON numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total: usize,
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub positive_pct: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub neutral_pct: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub negative_pct: Decimal,
}

/// Snapshot of the daily quota ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaState {
    pub used: u32,
    pub daily_limit: u32,
    /// Next instant at which `used` returns to zero.
    pub reset_at: DateTime<Utc>,
}

impl QuotaState {
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.daily_limit.saturating_sub(self.used)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_comment() -> Comment {
        Comment {
            comment_id: "c1".to_string(),
            video_id: "v1".to_string(),
            author: "Budi".to_string(),
            text: "mantap".to_string(),
            likes: 3,
            published_at: Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap(),
        }
    }

    #[test]
    fn sentiment_label_serializes_lowercase() {
        let json = serde_json::to_string(&SentimentLabel::Negative).unwrap();
        assert_eq!(json, "\"negative\"");
    }

    #[test]
    fn sentiment_label_parses_from_str() {
        assert_eq!(
            "positive".parse::<SentimentLabel>(),
            Ok(SentimentLabel::Positive)
        );
        assert!("mixed".parse::<SentimentLabel>().is_err());
    }

    #[test]
    fn classified_comment_flattens_sentiment_fields() {
        let item = ClassifiedComment {
            comment: sample_comment(),
            sentiment: SentimentResult {
                label: SentimentLabel::Positive,
                score: 0.5,
            },
        };
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["author"], "Budi");
        assert_eq!(value["sentiment"], "positive");
        assert_eq!(value["sentiment_score"], 0.5);
        assert_eq!(value["likes"], 3);
    }

    #[test]
    fn classified_comment_deserializes_flat_object() {
        let value = serde_json::json!({
            "comment_id": "c1",
            "video_id": "v1",
            "author": "Budi",
            "text": "mantap",
            "likes": 3,
            "published_at": "2024-02-01T08:00:00Z",
            "sentiment": "neutral",
            "sentiment_score": 0.0
        });
        let item: ClassifiedComment = serde_json::from_value(value).unwrap();
        assert_eq!(item.comment, sample_comment());
        assert_eq!(item.sentiment, SentimentResult::NEUTRAL);
    }

    #[test]
    fn quota_state_remaining_saturates() {
        let state = QuotaState {
            used: 120,
            daily_limit: 100,
            reset_at: Utc::now(),
        };
        assert_eq!(state.remaining(), 0);
    }

    #[test]
    fn statistics_percentages_serialize_as_numbers() {
        let stats = Statistics {
            total: 3,
            positive: 1,
            neutral: 1,
            negative: 1,
            positive_pct: Decimal::new(334, 1),
            neutral_pct: Decimal::new(333, 1),
            negative_pct: Decimal::new(333, 1),
        };
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["positive_pct"], serde_json::json!(33.4));
        assert_eq!(value["negative_pct"], serde_json::json!(33.3));

        let back: Statistics = serde_json::from_value(value).unwrap();
        assert_eq!(back, stats);
    }
}
