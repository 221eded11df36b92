use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::SourceFetchError;
use crate::models::Item;

/// A free-text search bounded to a recency window.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub query: String,
    pub from_days: u32,
    pub page_size: u32,
    pub language: String,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            from_days: 7,
            page_size: 25,
            language: "pt".to_string(),
        }
    }
}

/// Keyword search over a news index.
#[async_trait]
pub trait SearchSource: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Item>, SourceFetchError>;
}

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Article {
    title: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
    description: Option<String>,
}

fn article_to_item(article: Article) -> Item {
    Item {
        title: article.title,
        link: article.url,
        published: article.published_at,
        summary: Some(article.description.unwrap_or_default()),
    }
}

pub struct NewsApiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl NewsApiClient {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(20))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.into(),
        })
    }

    fn everything_url(
        &self,
        api_key: &str,
        query: &SearchQuery,
        now: DateTime<Utc>,
    ) -> Result<Url, SourceFetchError> {
        let since = now - Duration::days(i64::from(query.from_days));
        let from = since.format("%Y-%m-%dT%H:%M:%S").to_string();
        let page_size = query.page_size.to_string();
        let endpoint = format!("{}/v2/everything", self.base_url.trim_end_matches('/'));

        Url::parse_with_params(
            &endpoint,
            &[
                ("q", query.query.as_str()),
                ("apiKey", api_key),
                ("from", from.as_str()),
                ("pageSize", page_size.as_str()),
                ("language", query.language.as_str()),
                ("sortBy", "publishedAt"),
            ],
        )
        .map_err(|e| SourceFetchError::Parse {
            url: endpoint.clone(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl SearchSource for NewsApiClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Item>, SourceFetchError> {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!("No search API key configured, skipping query {:?}", query.query);
            return Ok(Vec::new());
        };

        let url = self.everything_url(api_key, query, Utc::now())?;
        // Never log the key
        let display_url = format!("{}/v2/everything?q={}", self.base_url, query.query);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| SourceFetchError::Request {
                url: display_url.clone(),
                source: source.without_url(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            return Err(SourceFetchError::Status {
                url: display_url,
                status: status.as_u16(),
                message: error_text.chars().take(200).collect(),
            });
        }

        let body = response
            .json::<EverythingResponse>()
            .await
            .map_err(|e| SourceFetchError::Parse {
                url: display_url,
                message: e.without_url().to_string(),
            })?;

        Ok(body.articles.into_iter().map(article_to_item).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_everything_url_carries_window_and_defaults() {
        let client = NewsApiClient::new(Some("k".to_string()), "https://newsapi.org/").unwrap();
        let now = Utc.with_ymd_and_hms(2025, 10, 13, 9, 30, 0).unwrap();
        let url = client
            .everything_url("k", &SearchQuery::new("Mercado Financeiro"), now)
            .unwrap();

        let params: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(url.path(), "/v2/everything");
        assert!(params.contains(&("q".into(), "Mercado Financeiro".into())));
        assert!(params.contains(&("from".into(), "2025-10-06T09:30:00".into())));
        assert!(params.contains(&("pageSize".into(), "25".into())));
        assert!(params.contains(&("language".into(), "pt".into())));
        assert!(params.contains(&("sortBy".into(), "publishedAt".into())));
    }

    #[tokio::test]
    async fn test_search_maps_articles() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .and(query_param("q", "IA"))
            .and(query_param("apiKey", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "ok",
                "articles": [
                    {"title": "GPT-5", "url": "https://x/1", "publishedAt": "2025-10-12T10:00:00Z", "description": null},
                    {"title": "LLM local", "url": "https://x/2", "publishedAt": "2025-10-11T10:00:00Z", "description": "openai"}
                ]
            })))
            .mount(&server)
            .await;

        let client = NewsApiClient::new(Some("secret".to_string()), server.uri()).unwrap();
        let items = client.search(&SearchQuery::new("IA")).await.unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].link.as_deref(), Some("https://x/1"));
        assert_eq!(items[0].published.as_deref(), Some("2025-10-12T10:00:00Z"));
        assert_eq!(items[0].summary.as_deref(), Some(""));
        assert_eq!(items[1].summary.as_deref(), Some("openai"));
    }

    #[tokio::test]
    async fn test_search_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("apiKeyInvalid"))
            .mount(&server)
            .await;

        let client = NewsApiClient::new(Some("bad".to_string()), server.uri()).unwrap();
        let err = client.search(&SearchQuery::new("IA")).await.unwrap_err();
        match err {
            SourceFetchError::Status { status, message, url } => {
                assert_eq!(status, 401);
                assert_eq!(message, "apiKeyInvalid");
                assert!(!url.contains("bad"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_search_without_key_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = NewsApiClient::new(None, server.uri()).unwrap();
        let items = client.search(&SearchQuery::new("IA")).await.unwrap();
        assert!(items.is_empty());
    }
}
