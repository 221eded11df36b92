use indexmap::IndexMap;

use crate::config::Topic;
use crate::models::Item;

/// Topic name -> items in that topic, in configured topic order.
pub type Buckets = IndexMap<String, Vec<Item>>;

/// Case-insensitive substring match of any keyword against title + summary.
pub fn matches_topic(item: &Item, topic: &Topic) -> bool {
    let text = item.match_text().to_lowercase();
    topic
        .keywords
        .iter()
        .any(|kw| text.contains(&kw.to_lowercase()))
}

/// Sort items into every topic they match.
///
/// Each configured topic gets a bucket, possibly empty. Items matching
/// nothing are dropped.
pub fn classify(items: &[Item], topics: &[Topic]) -> Buckets {
    let mut buckets: Buckets = topics
        .iter()
        .map(|t| (t.name.clone(), Vec::new()))
        .collect();

    for item in items {
        for topic in topics {
            if matches_topic(item, topic) {
                if let Some(bucket) = buckets.get_mut(&topic.name) {
                    bucket.push(item.clone());
                }
            }
        }
    }

    buckets
}
