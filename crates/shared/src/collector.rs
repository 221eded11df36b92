use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::config::DigestConfig;
use crate::feeds::FeedSource;
use crate::models::Item;
use crate::newsapi::{SearchQuery, SearchSource};

/// Drop items whose title+link was already seen. First occurrence wins.
pub fn dedupe(items: Vec<Item>) -> Vec<Item> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.identity_key()))
        .collect()
}

/// Reads every configured source, one at a time.
pub struct Collector<'a> {
    feeds: &'a dyn FeedSource,
    search: &'a dyn SearchSource,
    config: &'a DigestConfig,
}

impl<'a> Collector<'a> {
    pub fn new(
        feeds: &'a dyn FeedSource,
        search: &'a dyn SearchSource,
        config: &'a DigestConfig,
    ) -> Self {
        Self {
            feeds,
            search,
            config,
        }
    }

    /// All feed items in configured feed order.
    pub async fn fetch_feed_items(&self) -> Vec<Item> {
        let mut items = Vec::new();

        for url in &self.config.feeds {
            match self.feeds.fetch(url).await {
                Ok(feed_items) => {
                    debug!("Fetched {} items from {}", feed_items.len(), url);
                    items.extend(feed_items);
                }
                Err(e) => {
                    warn!("Failed to fetch feed {}: {}", url, e);
                }
            }
        }

        items
    }

    /// Search results, one query per topic, using the topic name as the query.
    pub async fn fetch_search_items(&self) -> Vec<Item> {
        let mut items = Vec::new();

        for topic in &self.config.topics {
            let query = SearchQuery {
                query: topic.name.clone(),
                from_days: self.config.recency_days,
                page_size: self.config.page_size,
                language: self.config.language.clone(),
            };

            match self.search.search(&query).await {
                Ok(found) => {
                    debug!("Search for {:?} returned {} items", topic.name, found.len());
                    items.extend(found);
                }
                Err(e) => {
                    warn!("Search for {:?} failed: {}", topic.name, e);
                }
            }
        }

        items
    }

    /// Feeds first, then search results, deduplicated.
    pub async fn collect(&self) -> Vec<Item> {
        let mut items = self.fetch_feed_items().await;
        let feed_count = items.len();
        items.extend(self.fetch_search_items().await);
        let raw_count = items.len();

        let items = dedupe(items);
        info!(
            "Collected {} raw items ({} from feeds), {} after dedupe",
            raw_count,
            feed_count,
            items.len()
        );
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceFetchError;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn titled(title: &str, link: &str) -> Item {
        Item::new(title, link, "")
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence_in_order() {
        let items = vec![
            titled("a", "1"),
            titled("b", "2"),
            titled("a", "1"),
            titled("c", "3"),
            titled("b", "2"),
        ];
        let titles: Vec<_> = dedupe(items)
            .into_iter()
            .map(|i| i.title.unwrap())
            .collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_dedupe_is_idempotent() {
        let once = dedupe(vec![
            titled("x", "1"),
            titled("x", "1"),
            titled("y", "1"),
            Item::default(),
            Item::default(),
        ]);
        assert_eq!(dedupe(once.clone()), once);
        assert_eq!(once.len(), 3);
    }

    #[test]
    fn test_same_link_different_title_both_kept() {
        let items = vec![
            Item::new("Banco Central sobe Selic", "a", "juros"),
            Item::new("G1 economia", "a", "x"),
        ];
        assert_eq!(dedupe(items).len(), 2);
    }

    #[test]
    fn test_same_title_and_link_different_summary_keeps_first() {
        let items = vec![
            Item::new("Selic", "a", "primeiro"),
            Item::new("Selic", "a", "segundo"),
        ];
        let out = dedupe(items);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].summary.as_deref(), Some("primeiro"));
    }

    #[test]
    fn test_identity_is_case_sensitive() {
        let items = vec![titled("Selic", "a"), titled("selic", "a")];
        assert_eq!(dedupe(items).len(), 2);
    }

    struct MapFeeds(HashMap<String, Vec<Item>>);

    #[async_trait]
    impl FeedSource for MapFeeds {
        async fn fetch(&self, url: &str) -> Result<Vec<Item>, SourceFetchError> {
            self.0
                .get(url)
                .cloned()
                .ok_or_else(|| SourceFetchError::Parse {
                    url: url.to_string(),
                    message: "boom".to_string(),
                })
        }
    }

    #[derive(Default)]
    struct RecordingSearch {
        queries: Mutex<Vec<SearchQuery>>,
    }

    #[async_trait]
    impl SearchSource for RecordingSearch {
        async fn search(&self, query: &SearchQuery) -> Result<Vec<Item>, SourceFetchError> {
            self.queries.lock().unwrap().push(query.clone());
            Ok(vec![titled(&format!("busca {}", query.query), "s")])
        }
    }

    #[tokio::test]
    async fn test_collect_orders_feeds_then_search_and_survives_failures() {
        let config = DigestConfig {
            feeds: vec![
                "feed-a".to_string(),
                "broken".to_string(),
                "feed-b".to_string(),
            ],
            recency_days: 3,
            ..DigestConfig::default()
        };
        let feeds = MapFeeds(HashMap::from([
            ("feed-a".to_string(), vec![titled("a1", "1"), titled("a2", "2")]),
            ("feed-b".to_string(), vec![titled("a1", "1"), titled("b1", "3")]),
        ]));
        let search = RecordingSearch::default();

        let items = Collector::new(&feeds, &search, &config).collect().await;
        let titles: Vec<_> = items.iter().map(|i| i.title.clone().unwrap()).collect();

        assert_eq!(
            titles,
            vec![
                "a1",
                "a2",
                "b1",
                "busca Marketing",
                "busca IA",
                "busca Tecnologia",
                "busca Mercado Imobiliário",
                "busca Brasil",
                "busca Mercado Financeiro",
            ]
        );

        let queries = search.queries.lock().unwrap();
        assert_eq!(queries.len(), 6);
        assert!(queries.iter().all(|q| q.from_days == 3));
        assert!(queries.iter().all(|q| q.page_size == 25 && q.language == "pt"));
    }
}
