use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use tracing::{debug, warn};

use crate::config::DigestConfig;
use crate::error::SummarizationError;
use crate::models::Item;

pub const SUMMARY_TEMPERATURE: f32 = 0.2;
pub const SUMMARY_MAX_TOKENS: u32 = 650;

/// One prompt to complete.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// A text-generation backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, SummarizationError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// OpenAI-compatible chat completions client.
pub struct OpenAiGenerator {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiGenerator {
    pub fn new(
        api_key: String,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            api_key,
            model: model.into(),
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, SummarizationError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: &request.prompt,
            }],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(format!(
                "{}/v1/chat/completions",
                self.base_url.trim_end_matches('/')
            ))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            return Err(SummarizationError::Status {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let chat = response
            .json::<ChatResponse>()
            .await
            .map_err(|e| SummarizationError::Parse(e.to_string()))?;

        Ok(chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}

/// Builds the per-topic prompt and turns the reply into the topic summary.
pub struct TopicSummarizer<'a> {
    generator: Option<&'a dyn TextGenerator>,
    max_items: usize,
    recency_days: u32,
}

impl<'a> TopicSummarizer<'a> {
    /// `generator` is `None` when no text-generation key is configured; the
    /// summarizer then lists the items instead.
    pub fn new(generator: Option<&'a dyn TextGenerator>, config: &DigestConfig) -> Self {
        Self {
            generator,
            max_items: config.max_items_per_topic,
            recency_days: config.recency_days,
        }
    }

    pub fn fallback_text(&self, topic: &str) -> String {
        format!(
            "Nenhuma notícia relevante encontrada para {} nos últimos {} dias.",
            topic, self.recency_days
        )
    }

    pub fn build_prompt(&self, topic: &str, items: &[Item]) -> String {
        let mut prompt = format!(
            "Crie um resumo executivo em PT-BR sobre {} citando as notícias mais relevantes dos últimos {} dias.\n\
            Formato:\n\
            1) TOP {}: TÍTULO + LINK + 1 frase de contexto.\n\
            2) 3 insights acionáveis.\n\
            3) 1 headline curta para post.\n\n\
            Notícias:\n",
            topic, self.recency_days, self.max_items
        );

        for item in items.iter().take(self.max_items) {
            let _ = writeln!(
                prompt,
                "- {}\n  {}",
                item.title.as_deref().unwrap_or(""),
                item.link.as_deref().unwrap_or("")
            );
        }
        prompt.push_str("\nAgora gere o resumo, direto e claro.");

        prompt
    }

    fn listing(&self, items: &[Item]) -> String {
        let mut text = String::from("Resumo automático indisponível. Principais notícias:\n");
        for item in items.iter().take(self.max_items) {
            let _ = writeln!(
                text,
                "- {}\n  {}",
                item.title.as_deref().unwrap_or(""),
                item.link.as_deref().unwrap_or("")
            );
        }
        text.trim_end().to_string()
    }

    pub async fn summarize(&self, topic: &str, items: &[Item]) -> Result<String, SummarizationError> {
        if items.is_empty() {
            return Ok(self.fallback_text(topic));
        }

        let Some(generator) = self.generator else {
            warn!("No text generation key configured, listing items for {}", topic);
            return Ok(self.listing(items));
        };

        let request = GenerationRequest {
            prompt: self.build_prompt(topic, items),
            max_tokens: SUMMARY_MAX_TOKENS,
            temperature: SUMMARY_TEMPERATURE,
        };
        debug!("Summarizing {} ({} items)", topic, items.len());

        let text = generator.generate(&request).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(SummarizationError::EmptyResponse {
                topic: topic.to_string(),
            });
        }

        Ok(text.to_string())
    }
}
