mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use ytsent_export::ExportStore;
use ytsent_sentiment::SentimentClassifier;
use ytsent_youtube::{Collector, QuotaConfig, QuotaLedger, YouTubeClient};

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ytsent_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let client = YouTubeClient::from_app_config(&config)?;
    let ledger = Arc::new(QuotaLedger::new(QuotaConfig::from_app_config(&config)));
    let collector = Collector::new(Arc::new(client), ledger);
    let classifier = SentimentClassifier::from_app_config(&config)?;

    tracing::info!(
        env = %config.env,
        bind_addr = %config.bind_addr,
        daily_limit = config.quota_daily_limit,
        backend = classifier.backend_name(),
        data_dir = %config.data_dir.display(),
        "starting ytsent server"
    );

    let app = build_app(AppState {
        collector,
        classifier: Arc::new(classifier),
        store: ExportStore::from_app_config(&config),
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
