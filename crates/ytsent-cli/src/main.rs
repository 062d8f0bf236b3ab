mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "ytsent-cli")]
#[command(about = "Quota-aware YouTube comment sentiment analysis")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search for videos matching a query
    Search {
        query: String,

        /// Number of videos to return (1-50)
        #[arg(long, default_value_t = 10)]
        max_results: u32,
    },
    /// Analyze one video's comments and export them
    Analyze {
        video_id: String,

        /// Upper bound on comments fetched
        #[arg(long, default_value_t = 100)]
        max_comments: usize,

        /// Export format: csv or json
        #[arg(long, default_value = "csv")]
        format: String,

        /// Write the export here instead of the data directory
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show the configured daily quota budget
    Quota,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("ytsent-cli ready; run with --help for commands");
        return Ok(());
    };

    let config = ytsent_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match command {
        Commands::Search { query, max_results } => {
            commands::run_search(&config, &query, max_results).await
        }
        Commands::Analyze {
            video_id,
            max_comments,
            format,
            output,
        } => {
            commands::run_analyze(&config, &video_id, max_comments, &format, output.as_deref())
                .await
        }
        Commands::Quota => {
            commands::run_quota(&config);
            Ok(())
        }
    }
}
