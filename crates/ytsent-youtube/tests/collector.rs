//! Quota and pagination behaviour of `Collector` against an in-memory platform.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use ytsent_core::{Comment, Video};
use ytsent_youtube::{
    Collector, CollectorError, CommentPage, PlatformError, QuotaConfig, QuotaLedger, VideoPlatform,
};

// ---------------------------------------------------------------------------
// Fake platform
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
enum Behaviour {
    /// Serve `total` comments, paginating with the requested page size.
    Serve { total: usize },
    /// Serve the first page, then fail with a 500.
    FailAfterFirstPage,
    /// Every call fails with a 500.
    AlwaysFail,
    /// Serve the first page, then report the key's daily quota spent.
    QuotaSpentAfterFirstPage,
    /// Every call reports the key's daily quota spent.
    QuotaSpent,
    /// Never respond.
    Hang,
}

struct FakePlatform {
    behaviour: Behaviour,
    search_calls: AtomicU32,
    page_calls: AtomicU32,
    page_sizes: Mutex<Vec<u32>>,
}

impl FakePlatform {
    fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            search_calls: AtomicU32::new(0),
            page_calls: AtomicU32::new(0),
            page_sizes: Mutex::new(Vec::new()),
        })
    }

    fn server_error() -> PlatformError {
        PlatformError::Api {
            status: 500,
            reason: Some("backendError".to_owned()),
            message: "Backend Error".to_owned(),
        }
    }

    fn quota_spent() -> PlatformError {
        PlatformError::Api {
            status: 403,
            reason: Some("quotaExceeded".to_owned()),
            message: "The request cannot be completed because you have exceeded your quota."
                .to_owned(),
        }
    }
}

fn comment(video_id: &str, i: usize) -> Comment {
    Comment {
        comment_id: format!("c{i}"),
        video_id: video_id.to_owned(),
        author: format!("user{i}"),
        text: format!("komentar nomor {i}"),
        likes: 0,
        published_at: Utc.with_ymd_and_hms(2024, 2, 10, 12, 0, 0).unwrap(),
    }
}

#[async_trait]
impl VideoPlatform for FakePlatform {
    async fn search_videos(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<Video>, PlatformError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        match self.behaviour {
            Behaviour::AlwaysFail => Err(Self::server_error()),
            Behaviour::QuotaSpent => Err(Self::quota_spent()),
            Behaviour::Hang => std::future::pending().await,
            _ => Ok((0..max_results.min(3))
                .map(|i| Video {
                    video_id: format!("v{i}"),
                    title: format!("{query} #{i}"),
                    channel: "Kanal".to_owned(),
                    published_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                    description: String::new(),
                })
                .collect()),
        }
    }

    async fn list_comment_threads(
        &self,
        video_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<CommentPage, PlatformError> {
        let call = self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.page_sizes.lock().unwrap().push(page_size);

        let total = match self.behaviour {
            Behaviour::Serve { total } => total,
            Behaviour::FailAfterFirstPage | Behaviour::QuotaSpentAfterFirstPage if call == 0 => {
                usize::MAX
            }
            Behaviour::QuotaSpentAfterFirstPage | Behaviour::QuotaSpent => {
                return Err(Self::quota_spent())
            }
            Behaviour::FailAfterFirstPage | Behaviour::AlwaysFail => {
                return Err(Self::server_error())
            }
            Behaviour::Hang => std::future::pending().await,
        };

        let start: usize = page_token.map_or(0, |t| t.parse().unwrap());
        let end = start.saturating_add(page_size as usize).min(total);
        Ok(CommentPage {
            comments: (start..end).map(|i| comment(video_id, i)).collect(),
            next_page_token: (end < total).then(|| end.to_string()),
        })
    }
}

fn collector(platform: &Arc<FakePlatform>, daily_limit: u32) -> Collector {
    let ledger = Arc::new(QuotaLedger::new(QuotaConfig {
        daily_limit,
        ..QuotaConfig::default()
    }));
    Collector::new(platform.clone(), ledger)
}

// ---------------------------------------------------------------------------
// search
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_is_billed_once_per_call() {
    let platform = FakePlatform::new(Behaviour::Serve { total: 0 });
    let collector = collector(&platform, 10_000);

    let first = collector.search("pemilu", 10).await.expect("first search");
    let second = collector.search("pemilu", 10).await.expect("second search");

    assert_eq!(first.len(), 3);
    assert_eq!(second.len(), 3);
    assert_eq!(platform.search_calls.load(Ordering::SeqCst), 2);
    assert_eq!(collector.quota().used, 200);
}

#[tokio::test]
async fn search_rejected_when_budget_is_short() {
    let platform = FakePlatform::new(Behaviour::Serve { total: 0 });
    let collector = collector(&platform, 10_000);
    collector.ledger().reserve(9_950).expect("seed usage");

    let err = collector.search("pemilu", 10).await.unwrap_err();

    match err {
        CollectorError::QuotaExceeded(e) => {
            assert_eq!(e.requested, 100);
            assert_eq!(e.used, 9_950);
            assert_eq!(e.limit, 10_000);
        }
        other => panic!("expected QuotaExceeded, got {other:?}"),
    }
    assert_eq!(platform.search_calls.load(Ordering::SeqCst), 0);
    assert_eq!(collector.quota().used, 9_950);
}

#[tokio::test]
async fn failed_search_is_not_billed() {
    let platform = FakePlatform::new(Behaviour::AlwaysFail);
    let collector = collector(&platform, 10_000);

    let err = collector.search("pemilu", 10).await.unwrap_err();

    assert!(matches!(err, CollectorError::Upstream { status: Some(500), .. }));
    assert_eq!(collector.quota().used, 0);
}

#[tokio::test]
async fn cancelled_search_is_not_billed() {
    let platform = FakePlatform::new(Behaviour::Hang);
    let collector = collector(&platform, 10_000);

    let outcome =
        tokio::time::timeout(Duration::from_millis(50), collector.search("pemilu", 10)).await;

    assert!(outcome.is_err(), "search should have timed out");
    assert_eq!(platform.search_calls.load(Ordering::SeqCst), 1);
    assert_eq!(collector.quota().used, 0);
}

#[tokio::test]
async fn search_validates_arguments_before_billing() {
    let platform = FakePlatform::new(Behaviour::Serve { total: 0 });
    let collector = collector(&platform, 10_000);

    for (query, max) in [("   ", 10), ("pemilu", 0), ("pemilu", 51)] {
        let err = collector.search(query, max).await.unwrap_err();
        assert!(
            matches!(err, CollectorError::InvalidRequest(_)),
            "({query:?}, {max}) gave {err:?}"
        );
    }
    assert_eq!(platform.search_calls.load(Ordering::SeqCst), 0);
    assert_eq!(collector.quota().used, 0);
}

// ---------------------------------------------------------------------------
// fetch_comments
// ---------------------------------------------------------------------------

#[tokio::test]
async fn short_source_returns_everything_available() {
    let platform = FakePlatform::new(Behaviour::Serve { total: 40 });
    let collector = collector(&platform, 10_000);

    let batch = collector.fetch_comments("vid", 100).await.expect("fetch");

    assert_eq!(batch.comments.len(), 40);
    assert!(!batch.truncated);
    assert_eq!(batch.pages, 1);
    assert_eq!(collector.quota().used, 1);
}

#[tokio::test]
async fn never_returns_more_than_requested() {
    let platform = FakePlatform::new(Behaviour::Serve { total: 1_000 });
    let collector = collector(&platform, 10_000);

    let batch = collector.fetch_comments("vid", 250).await.expect("fetch");

    assert_eq!(batch.comments.len(), 250);
    assert_eq!(batch.pages, 3);
    assert_eq!(*platform.page_sizes.lock().unwrap(), vec![100, 100, 50]);
    assert_eq!(batch.comments[249].comment_id, "c249");
    assert_eq!(collector.quota().used, 3);
}

#[tokio::test]
async fn quota_exhaustion_mid_pagination_returns_partial_batch() {
    let platform = FakePlatform::new(Behaviour::Serve { total: 1_000 });
    let collector = collector(&platform, 3);

    let batch = collector.fetch_comments("vid", 1_000).await.expect("partial");

    assert!(batch.truncated);
    assert_eq!(batch.pages, 3);
    assert_eq!(batch.comments.len(), 300);
    assert_eq!(platform.page_calls.load(Ordering::SeqCst), 3);
    assert_eq!(collector.quota().used, 3);
}

#[tokio::test]
async fn quota_exhausted_before_first_page_is_an_error() {
    let platform = FakePlatform::new(Behaviour::Serve { total: 1_000 });
    let collector = collector(&platform, 100);
    collector.ledger().reserve(100).expect("seed usage");

    let err = collector.fetch_comments("vid", 10).await.unwrap_err();

    assert!(matches!(err, CollectorError::QuotaExceeded(_)), "got {err:?}");
    assert_eq!(platform.page_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn upstream_failure_mid_pagination_bills_only_received_pages() {
    let platform = FakePlatform::new(Behaviour::FailAfterFirstPage);
    let collector = collector(&platform, 10_000);

    let err = collector.fetch_comments("vid", 500).await.unwrap_err();

    assert!(err.is_retryable());
    assert_eq!(platform.page_calls.load(Ordering::SeqCst), 2);
    assert_eq!(collector.quota().used, 1);
}

#[tokio::test]
async fn platform_quota_rejection_mid_pagination_keeps_paid_pages() {
    let platform = FakePlatform::new(Behaviour::QuotaSpentAfterFirstPage);
    let collector = collector(&platform, 10_000);

    let batch = collector.fetch_comments("vid", 500).await.expect("partial batch");

    assert!(batch.truncated);
    assert_eq!(batch.comments.len(), 100);
    assert_eq!(batch.pages, 1);
    assert_eq!(platform.page_calls.load(Ordering::SeqCst), 2);
    // The platform's count wins: nothing more is attempted today.
    assert_eq!(collector.quota().remaining(), 0);
    let err = collector.fetch_comments("vid", 10).await.unwrap_err();
    assert!(matches!(err, CollectorError::QuotaExceeded(_)), "got {err:?}");
    assert_eq!(platform.page_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn platform_quota_rejection_on_first_page_is_quota_exceeded() {
    let platform = FakePlatform::new(Behaviour::QuotaSpent);
    let collector = collector(&platform, 10_000);

    let err = collector.fetch_comments("vid", 100).await.unwrap_err();

    match err {
        CollectorError::QuotaExceeded(e) => {
            assert_eq!(e.requested, 1);
            assert_eq!(e.limit, 10_000);
        }
        other => panic!("expected QuotaExceeded, got {other:?}"),
    }
    assert_eq!(collector.quota().used, 10_000);
}

#[tokio::test]
async fn platform_quota_rejection_on_search_closes_the_budget() {
    let platform = FakePlatform::new(Behaviour::QuotaSpent);
    let collector = collector(&platform, 10_000);

    let err = collector.search("pemilu", 5).await.unwrap_err();

    assert!(matches!(err, CollectorError::QuotaExceeded(_)), "got {err:?}");
    assert!(collector.search("pemilu", 5).await.is_err());
    assert_eq!(platform.search_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn page_limit_returns_collected_comments_as_truncated() {
    let platform = FakePlatform::new(Behaviour::Serve { total: 100_000 });
    let collector = collector(&platform, 10_000);

    let batch = collector.fetch_comments("vid", 50_000).await.expect("partial batch");

    assert!(batch.truncated);
    assert_eq!(batch.pages, 200);
    assert_eq!(batch.comments.len(), 20_000);
    assert_eq!(collector.quota().used, 200);
}

#[tokio::test]
async fn cancelled_page_fetch_is_not_billed() {
    let platform = FakePlatform::new(Behaviour::Hang);
    let collector = collector(&platform, 10_000);

    let outcome =
        tokio::time::timeout(Duration::from_millis(50), collector.fetch_comments("vid", 100)).await;

    assert!(outcome.is_err());
    assert_eq!(collector.quota().used, 0);
}

#[tokio::test]
async fn concurrent_fetches_never_overspend() {
    let platform = FakePlatform::new(Behaviour::Serve { total: 10_000 });
    let collector = collector(&platform, 25);

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let collector = collector.clone();
            tokio::spawn(async move { collector.fetch_comments(&format!("vid{i}"), 10_000).await })
        })
        .collect();

    let mut pages = 0;
    for task in tasks {
        if let Ok(batch) = task.await.expect("join") {
            pages += batch.pages;
        }
    }

    assert_eq!(pages, 25);
    assert_eq!(collector.quota().used, 25);
    assert_eq!(platform.page_calls.load(Ordering::SeqCst), 25);
}

#[tokio::test]
async fn fetch_validates_arguments() {
    let platform = FakePlatform::new(Behaviour::Serve { total: 10 });
    let collector = collector(&platform, 10_000);

    assert!(matches!(
        collector.fetch_comments(" ", 10).await,
        Err(CollectorError::InvalidRequest(_))
    ));
    assert!(matches!(
        collector.fetch_comments("vid", 0).await,
        Err(CollectorError::InvalidRequest(_))
    ));
    assert_eq!(collector.quota().used, 0);
}
