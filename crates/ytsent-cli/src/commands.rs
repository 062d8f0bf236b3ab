//! Command handlers for the CLI.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use ytsent_core::{AppConfig, Statistics};
use ytsent_export::{serialize, ExportFormat, ExportStore};
use ytsent_sentiment::SentimentClassifier;
use ytsent_youtube::{Collector, QuotaConfig, QuotaLedger, YouTubeClient};

fn build_collector(config: &AppConfig) -> anyhow::Result<Collector> {
    let client = YouTubeClient::from_app_config(config)?;
    let ledger = Arc::new(QuotaLedger::new(QuotaConfig::from_app_config(config)));
    Ok(Collector::new(Arc::new(client), ledger))
}

/// Search for videos and print one line per hit.
///
/// # Errors
///
/// Returns an error if the client cannot be built or the search fails.
pub(crate) async fn run_search(
    config: &AppConfig,
    query: &str,
    max_results: u32,
) -> anyhow::Result<()> {
    let collector = build_collector(config)?;
    let videos = collector.search(query, max_results).await?;

    if videos.is_empty() {
        println!("no videos found for '{query}'");
    }
    for video in &videos {
        println!(
            "{}  {}  [{}]  {}",
            video.video_id,
            video.published_at.format("%Y-%m-%d"),
            video.channel,
            video.title
        );
    }

    let quota = collector.quota();
    println!(
        "quota: {}/{} units used, {} remaining",
        quota.used,
        quota.daily_limit,
        quota.remaining()
    );
    Ok(())
}

/// Analyze one video and write the classified comments in `format`.
///
/// The format is validated before any quota is spent.
///
/// # Errors
///
/// Returns an error on an unknown format, a collection or classification
/// failure, or when the export cannot be written.
pub(crate) async fn run_analyze(
    config: &AppConfig,
    video_id: &str,
    max_comments: usize,
    format: &str,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let format: ExportFormat = format.parse()?;
    let collector = build_collector(config)?;
    let classifier = SentimentClassifier::from_app_config(config)?;

    let analysis =
        ytsent_sentiment::analyze_video(&collector, &classifier, video_id, max_comments).await?;

    if analysis.comments.is_empty() {
        println!("no comments found for video {video_id}");
        return Ok(());
    }

    print_statistics(&analysis.statistics);
    if analysis.truncated {
        println!(
            "note: daily quota ran out; only {} of {max_comments} requested comments were analyzed",
            analysis.comments.len()
        );
    }

    let bytes = serialize(&analysis.comments, format)?;
    let path = match output {
        Some(path) => {
            tokio::fs::write(path, &bytes)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            path.to_path_buf()
        }
        None => ExportStore::from_app_config(config).save(&bytes, format).await?,
    };
    tracing::info!(path = %path.display(), %format, "export written");
    println!("exported {} comments to {}", analysis.comments.len(), path.display());

    println!(
        "quota: {}/{} units used",
        analysis.quota.used, analysis.quota.daily_limit
    );
    Ok(())
}

/// Print the configured quota budget.
pub(crate) fn run_quota(config: &AppConfig) {
    let ledger = QuotaLedger::new(QuotaConfig::from_app_config(config));
    let state = ledger.current_state();
    let costs = ledger.costs();
    println!("daily limit:   {} units", state.daily_limit);
    println!("search cost:   {} units", costs.search);
    println!("comment page:  {} units", costs.comment_page);
    println!("next reset:    {}", state.reset_at.to_rfc3339());
}

fn print_statistics(stats: &Statistics) {
    println!("comments analyzed: {}", stats.total);
    let rows = [
        ("positive", stats.positive, stats.positive_pct),
        ("neutral", stats.neutral, stats.neutral_pct),
        ("negative", stats.negative, stats.negative_pct),
    ];
    for (label, count, pct) in rows {
        println!("  {label:<8}  {count:>5}  {:>5}%", pct.to_string());
    }
}
