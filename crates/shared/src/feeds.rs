//! RSS / Atom feed reader

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::error::SourceFetchError;
use crate::models::Item;

/// Anything that can turn a feed endpoint into items.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<Item>, SourceFetchError>;
}

pub struct FeedReader {
    client: Client,
}

impl FeedReader {
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(20))
            .user_agent("Mozilla/5.0 (compatible; NewsDigest/1.0)")
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl FeedSource for FeedReader {
    async fn fetch(&self, url: &str) -> Result<Vec<Item>, SourceFetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| SourceFetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceFetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }

        let content = response
            .bytes()
            .await
            .map_err(|source| SourceFetchError::Request {
                url: url.to_string(),
                source,
            })?;

        parse_feed(&content).ok_or_else(|| SourceFetchError::Parse {
            url: url.to_string(),
            message: "neither RSS nor Atom".to_string(),
        })
    }
}

/// Parse a feed body, trying RSS first and then Atom.
pub fn parse_feed(content: &[u8]) -> Option<Vec<Item>> {
    if let Ok(channel) = rss::Channel::read_from(content) {
        return Some(channel.items().iter().map(rss_item).collect());
    }

    if let Ok(feed) = atom_syndication::Feed::read_from(content) {
        return Some(feed.entries().iter().map(atom_entry).collect());
    }

    None
}

fn rss_item(item: &rss::Item) -> Item {
    Item {
        title: item.title().map(str::to_string),
        link: item.link().map(str::to_string),
        published: item.pub_date().map(str::to_string),
        summary: item.description().map(str::to_string),
    }
}

fn atom_entry(entry: &atom_syndication::Entry) -> Item {
    let summary = entry
        .summary()
        .map(|s| s.value.clone())
        .or_else(|| entry.content().and_then(|c| c.value().map(str::to_string)));

    Item {
        title: Some(entry.title().value.clone()).filter(|t| !t.is_empty()),
        link: entry.links().first().map(|l| l.href().to_string()),
        published: Some(
            entry
                .published()
                .map(|d| d.to_rfc3339())
                .unwrap_or_else(|| entry.updated().to_rfc3339()),
        ),
        summary,
    }
}
