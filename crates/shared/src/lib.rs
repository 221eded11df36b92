// Public modules
pub mod classifier;
pub mod collector;
pub mod config;
pub mod error;
pub mod feeds;
pub mod io;
pub mod mailer;
pub mod models;
pub mod newsapi;
pub mod pipeline;
pub mod report;
pub mod summarizer;

// Re-export commonly used types
pub use classifier::{classify, Buckets};
pub use collector::{dedupe, Collector};
pub use config::{Config, DigestConfig, SmtpSettings, Topic};
pub use error::{
    DeliveryError, MalformedStoreError, PersistError, PipelineError, SourceFetchError,
    SummarizationError,
};
pub use feeds::{FeedReader, FeedSource};
pub use io::{
    load_snapshot, save_snapshot, save_summary_record, DEFAULT_SNAPSHOT_FILE, DEFAULT_SUMMARY_FILE,
};
pub use mailer::{MailTransport, OutgoingMail, SmtpMailer};
pub use models::{CollectionSnapshot, Item, SummaryRecord};
pub use newsapi::{NewsApiClient, SearchQuery, SearchSource};
pub use pipeline::SendPhase;
pub use report::ReportRenderer;
pub use summarizer::{GenerationRequest, OpenAiGenerator, TextGenerator, TopicSummarizer};
