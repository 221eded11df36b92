use anyhow::{Context, Result};
use clap::Parser;
use shared::{
    pipeline, Config, DigestConfig, FeedReader, NewsApiClient, OpenAiGenerator, SendPhase,
    SmtpMailer, TextGenerator, DEFAULT_SNAPSHOT_FILE, DEFAULT_SUMMARY_FILE,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "news-digest")]
#[command(about = "Collect news by topic, summarize each topic and e-mail the digest")]
struct Args {
    /// Only collect and save the snapshot
    #[arg(long, conflicts_with = "summarize_and_send")]
    collect_only: bool,

    /// Summarize a saved snapshot and send it (defaults to the snapshot path)
    #[arg(long, value_name = "PATH")]
    summarize_and_send: Option<Option<PathBuf>>,

    /// JSON file with topics, feeds and limits
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of days to look back when searching
    #[arg(short, long)]
    days: Option<u32>,

    /// Where the collect phase writes its snapshot
    #[arg(long, default_value = DEFAULT_SNAPSHOT_FILE)]
    snapshot: PathBuf,

    /// Where the summary record is written after sending
    #[arg(long, default_value = DEFAULT_SUMMARY_FILE)]
    summary: PathBuf,
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let config = Config::from_env()?;
    let mut digest = match &args.config {
        Some(path) => DigestConfig::from_file(path)?,
        None => DigestConfig::default(),
    };
    if let Some(days) = args.days {
        digest.recency_days = days;
    }

    if args.collect_only {
        return collect(&config, &digest, &args.snapshot).await;
    }

    if let Some(path) = args.summarize_and_send {
        let snapshot = path.unwrap_or(args.snapshot);
        return summarize_and_send(&config, &digest, &snapshot, &args.summary).await;
    }

    collect(&config, &digest, &args.snapshot).await?;
    summarize_and_send(&config, &digest, &args.snapshot, &args.summary).await
}

async fn collect(config: &Config, digest: &DigestConfig, snapshot_path: &Path) -> Result<()> {
    println!("📰 Collecting from {} feeds...", digest.feeds.len());
    if config.newsapi_key.is_none() {
        info!("NEWSAPI_KEY not set - search results will be skipped");
    }

    let feeds = FeedReader::new().context("Failed to create HTTP client")?;
    let search = NewsApiClient::new(config.newsapi_key.clone(), &config.newsapi_base_url)
        .context("Failed to create HTTP client")?;

    let snapshot = pipeline::collect(&feeds, &search, digest, snapshot_path)
        .await
        .context("Failed to save collection")?;

    println!(
        "✓ Collected {} items into {}",
        snapshot.items.len(),
        snapshot_path.display()
    );
    Ok(())
}

async fn summarize_and_send(
    config: &Config,
    digest: &DigestConfig,
    snapshot_path: &Path,
    summary_path: &Path,
) -> Result<()> {
    println!("🤖 Summarizing {}...", snapshot_path.display());

    let generator = match &config.openai_key {
        Some(key) => Some(
            OpenAiGenerator::new(key.clone(), &config.openai_model, &config.openai_base_url)
                .context("Failed to create HTTP client")?,
        ),
        None => {
            warn!("OPENAI_KEY not set - topics will be listed without a generated summary");
            None
        }
    };
    let mailer = SmtpMailer::new(config.smtp.clone());

    let phase = SendPhase {
        generator: generator.as_ref().map(|g| g as &dyn TextGenerator),
        mailer: &mailer,
        config: digest,
    };
    let record = phase
        .run(snapshot_path, summary_path)
        .await
        .context("Summarize-and-send failed")?;

    println!(
        "✅ Digest with {} topics sent to {}, record saved to {}",
        record.summaries.len(),
        config.smtp.recipient_or_sender().unwrap_or("?"),
        summary_path.display()
    );
    Ok(())
}
