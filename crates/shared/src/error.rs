//! Error types for the digest pipeline

use std::path::PathBuf;

use thiserror::Error;

/// A single feed or search source could not be read.
///
/// Never fatal: the collector logs it and moves on to the next source.
#[derive(Debug, Error)]
pub enum SourceFetchError {
    /// HTTP request failed before a response arrived
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Source answered with a non-2xx status
    #[error("{url} returned status {status}: {message}")]
    Status {
        url: String,
        status: u16,
        message: String,
    },

    /// Body was not a feed / not the expected JSON
    #[error("Failed to parse response from {url}: {message}")]
    Parse { url: String, message: String },
}

/// The collection snapshot on disk is missing, unreadable or incomplete.
#[derive(Debug, Error)]
pub enum MalformedStoreError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a valid collection file: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} has an invalid collected_at timestamp: {value}", path.display())]
    InvalidTimestamp { path: PathBuf, value: String },
}

/// Writing an artifact (snapshot or summary record) failed.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Failed to serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The text-generation service failed or answered with nothing usable.
#[derive(Debug, Error)]
pub enum SummarizationError {
    #[error("Text generation request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Text generation API error (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("Failed to parse text generation response: {0}")]
    Parse(String),

    #[error("Text generation returned an empty response for {topic}")]
    EmptyResponse { topic: String },
}

/// The mail could not be built or handed to the SMTP server.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Missing mail setting {0}")]
    MissingCredentials(&'static str),

    #[error("Invalid e-mail address: {0}")]
    InvalidAddress(#[from] lettre::address::AddressError),

    #[error("Failed to build e-mail message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP transport failed: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Any failure that ends a summarize-and-send run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    MalformedStore(#[from] MalformedStoreError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Summarization(#[from] SummarizationError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}
