//! The two phases of a digest run: collect, then summarize-and-send.

use chrono::Utc;
use indexmap::IndexMap;
use std::path::Path;
use tracing::info;

use crate::classifier::{classify, Buckets};
use crate::collector::Collector;
use crate::config::DigestConfig;
use crate::error::{PersistError, PipelineError, SummarizationError};
use crate::feeds::FeedSource;
use crate::io::{load_snapshot, save_snapshot, save_summary_record};
use crate::mailer::{MailTransport, OutgoingMail};
use crate::models::{CollectionSnapshot, SummaryRecord};
use crate::newsapi::SearchSource;
use crate::report::ReportRenderer;
use crate::summarizer::{TextGenerator, TopicSummarizer};

/// Collect every source, dedupe and write the snapshot to `snapshot_path`.
pub async fn collect(
    feeds: &dyn FeedSource,
    search: &dyn SearchSource,
    config: &DigestConfig,
    snapshot_path: &Path,
) -> Result<CollectionSnapshot, PersistError> {
    let items = Collector::new(feeds, search, config).collect().await;

    let snapshot = CollectionSnapshot::new(items, Utc::now());
    save_snapshot(&snapshot, snapshot_path)?;
    info!(
        "Saved {} items to {}",
        snapshot.items.len(),
        snapshot_path.display()
    );

    Ok(snapshot)
}

/// Summarize every topic in configured order. Stops at the first failure.
pub async fn summarize_topics(
    summarizer: &TopicSummarizer<'_>,
    buckets: &Buckets,
) -> Result<IndexMap<String, String>, SummarizationError> {
    let mut summaries = IndexMap::new();

    for (topic, items) in buckets {
        let text = summarizer.summarize(topic, items).await?;
        summaries.insert(topic.clone(), text);
    }

    Ok(summaries)
}

/// Collaborators used by the summarize-and-send phase.
pub struct SendPhase<'a> {
    pub generator: Option<&'a dyn TextGenerator>,
    pub mailer: &'a dyn MailTransport,
    pub config: &'a DigestConfig,
}

impl SendPhase<'_> {
    /// Load the snapshot, classify, summarize, render, send, then record.
    ///
    /// The summary record is only written after the mail went out.
    pub async fn run(
        &self,
        snapshot_path: &Path,
        summary_path: &Path,
    ) -> Result<SummaryRecord, PipelineError> {
        let snapshot = load_snapshot(snapshot_path)?;
        info!(
            "Loaded {} items collected at {}",
            snapshot.items.len(),
            snapshot.collected_at
        );

        let buckets = classify(&snapshot.items, &self.config.topics);
        for (topic, items) in &buckets {
            info!("{}: {} items", topic, items.len());
        }

        let summarizer = TopicSummarizer::new(self.generator, self.config);
        let summaries = summarize_topics(&summarizer, &buckets).await?;

        let generated_at = Utc::now();
        let mail = OutgoingMail {
            subject: ReportRenderer::subject_line(&self.config.topic_names()),
            html_body: ReportRenderer::render(&buckets, &summaries, generated_at),
        };
        self.mailer.send(&mail).await?;

        let record = SummaryRecord::new(summaries, generated_at);
        save_summary_record(&record, summary_path)?;

        Ok(record)
    }
}
