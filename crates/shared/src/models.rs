use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single news record, normalized from a feed entry or a search result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    /// Source-dependent timestamp, kept as delivered
    #[serde(default)]
    pub published: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

impl Item {
    pub fn new(title: impl Into<String>, link: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            link: Some(link.into()),
            published: None,
            summary: Some(summary.into()),
        }
    }

    /// Identity used for deduplication: title followed by link.
    pub fn identity_key(&self) -> String {
        let mut key = self.title.clone().unwrap_or_default();
        key.push_str(self.link.as_deref().unwrap_or(""));
        key
    }

    /// Text the classifier matches keywords against.
    pub fn match_text(&self) -> String {
        format!(
            "{} {}",
            self.title.as_deref().unwrap_or(""),
            self.summary.as_deref().unwrap_or("")
        )
    }
}

/// The deduplicated collection handed from the collect phase to the
/// summarize phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSnapshot {
    pub collected_at: String,
    pub items: Vec<Item>,
}

impl CollectionSnapshot {
    pub fn new(items: Vec<Item>, collected_at: DateTime<Utc>) -> Self {
        Self {
            collected_at: collected_at.to_rfc3339(),
            items,
        }
    }
}

/// Audit record of what was sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub generated_at: String,
    pub summaries: IndexMap<String, String>,
}

impl SummaryRecord {
    pub fn new(summaries: IndexMap<String, String>, generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at: generated_at.to_rfc3339(),
            summaries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_key_treats_missing_as_empty() {
        let item = Item {
            title: None,
            link: Some("https://a".to_string()),
            ..Default::default()
        };
        assert_eq!(item.identity_key(), "https://a");
        assert_eq!(Item::default().identity_key(), "");
    }

    #[test]
    fn test_identity_key_ignores_summary_and_date() {
        let mut a = Item::new("Title", "link", "one");
        let mut b = Item::new("Title", "link", "two");
        a.published = Some("yesterday".to_string());
        b.published = None;
        assert_eq!(a.identity_key(), b.identity_key());
    }

    #[test]
    fn test_item_with_null_fields_deserializes() {
        let item: Item =
            serde_json::from_str(r#"{"title": null, "link": "x", "summary": ""}"#).unwrap();
        assert_eq!(item.title, None);
        assert_eq!(item.link.as_deref(), Some("x"));
        assert_eq!(item.published, None);
    }
}
