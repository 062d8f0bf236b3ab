//! End-to-end `analyze_video` runs over an in-memory platform and the lexicon
//! backend.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;

use ytsent_core::{Comment, SentimentLabel, Video};
use ytsent_sentiment::{analyze_video, AnalysisError, LexiconBackend, SentimentClassifier};
use ytsent_youtube::{
    Collector, CollectorError, CommentPage, PlatformError, QuotaConfig, QuotaLedger, VideoPlatform,
};

/// Serves a fixed list of comment texts in pages.
struct StaticComments {
    texts: Vec<&'static str>,
    disabled: bool,
}

#[async_trait]
impl VideoPlatform for StaticComments {
    async fn search_videos(&self, _: &str, _: u32) -> Result<Vec<Video>, PlatformError> {
        Ok(Vec::new())
    }

    async fn list_comment_threads(
        &self,
        video_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<CommentPage, PlatformError> {
        if self.disabled {
            return Err(PlatformError::CommentsDisabled {
                video_id: video_id.to_owned(),
            });
        }
        let start: usize = page_token.map_or(0, |t| t.parse().unwrap());
        let end = (start + page_size as usize).min(self.texts.len());
        Ok(CommentPage {
            comments: (start..end)
                .map(|i| Comment {
                    comment_id: format!("c{i}"),
                    video_id: video_id.to_owned(),
                    author: format!("warga{i}"),
                    text: self.texts[i].to_owned(),
                    likes: i as u64,
                    published_at: Utc.with_ymd_and_hms(2024, 2, 14, 9, 0, 0).unwrap(),
                })
                .collect(),
            next_page_token: (end < self.texts.len()).then(|| end.to_string()),
        })
    }
}

fn collector(platform: StaticComments, daily_limit: u32) -> Collector {
    Collector::new(
        Arc::new(platform),
        Arc::new(QuotaLedger::new(QuotaConfig {
            daily_limit,
            ..QuotaConfig::default()
        })),
    )
}

fn classifier() -> SentimentClassifier {
    SentimentClassifier::new(Arc::new(LexiconBackend))
}

#[tokio::test]
async fn analyzes_every_fetched_comment() {
    let collector = collector(
        StaticComments {
            texts: vec![
                "Debatnya mantap, bangga sama kandidat ini",
                "Semua pembohong dan korupsi",
                "Jam berapa acaranya?",
                "",
                "Setuju, programnya bagus",
            ],
            disabled: false,
        },
        10_000,
    );

    let analysis = analyze_video(&collector, &classifier(), "vid", 100)
        .await
        .expect("analysis");

    assert_eq!(analysis.video_id, "vid");
    assert_eq!(analysis.comments.len(), 5);
    assert!(!analysis.truncated);

    let labels: Vec<_> = analysis.comments.iter().map(|c| c.sentiment.label).collect();
    assert_eq!(
        labels,
        vec![
            SentimentLabel::Positive,
            SentimentLabel::Negative,
            SentimentLabel::Neutral,
            SentimentLabel::Neutral,
            SentimentLabel::Positive,
        ]
    );

    let stats = &analysis.statistics;
    assert_eq!((stats.total, stats.positive, stats.neutral, stats.negative), (5, 2, 2, 1));
    assert_eq!(
        (stats.positive_pct, stats.neutral_pct, stats.negative_pct),
        (Decimal::new(400, 1), Decimal::new(400, 1), Decimal::new(200, 1))
    );
    assert_eq!(analysis.quota.used, 1);
}

#[tokio::test]
async fn truncated_collection_is_still_analyzed() {
    let texts: Vec<&'static str> = std::iter::repeat("mantap").take(250).collect();
    let collector = collector(
        StaticComments {
            texts,
            disabled: false,
        },
        2,
    );

    let analysis = analyze_video(&collector, &classifier(), "vid", 250)
        .await
        .expect("partial analysis");

    assert!(analysis.truncated);
    assert_eq!(analysis.comments.len(), 200);
    assert_eq!(analysis.statistics.total, 200);
    assert_eq!(analysis.statistics.positive_pct, Decimal::ONE_HUNDRED);
    assert_eq!(analysis.quota.used, 2);
    assert_eq!(analysis.quota.remaining(), 0);
}

#[tokio::test]
async fn collector_errors_surface_unchanged() {
    let collector = collector(
        StaticComments {
            texts: Vec::new(),
            disabled: true,
        },
        10_000,
    );

    let err = analyze_video(&collector, &classifier(), "vid", 10)
        .await
        .unwrap_err();

    assert!(
        matches!(
            err,
            AnalysisError::Collector(CollectorError::CommentsDisabled { .. })
        ),
        "got {err:?}"
    );
}
