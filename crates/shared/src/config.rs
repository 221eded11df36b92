use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_NEWSAPI_BASE_URL: &str = "https://newsapi.org";

/// Credentials and endpoints read from the environment.
///
/// Every field is optional: a missing search or generation key only disables
/// that feature. Missing mail credentials surface later, when delivery runs.
#[derive(Clone)]
pub struct Config {
    pub newsapi_key: Option<String>,
    pub newsapi_base_url: String,
    pub openai_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub smtp: SmtpSettings,
}

#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub recipient: Option<String>,
}

impl SmtpSettings {
    /// Configured recipient, or the sender when none is set.
    pub fn recipient_or_sender(&self) -> Option<&str> {
        self.recipient.as_deref().or(self.username.as_deref())
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("newsapi_key", &self.newsapi_key.as_ref().map(|_| "<redacted>"))
            .field("newsapi_base_url", &self.newsapi_base_url)
            .field("openai_key", &self.openai_key.as_ref().map(|_| "<redacted>"))
            .field("openai_model", &self.openai_model)
            .field("openai_base_url", &self.openai_base_url)
            .field("smtp", &self.smtp)
            .finish()
    }
}

impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("recipient", &self.recipient)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Try to load .env from multiple locations
        Self::try_load_dotenv();

        let port = match non_empty_var("SMTP_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("SMTP_PORT must be a port number, got {:?}", raw))?,
            None => DEFAULT_SMTP_PORT,
        };

        Ok(Self {
            newsapi_key: non_empty_var("NEWSAPI_KEY"),
            newsapi_base_url: non_empty_var("NEWSAPI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_NEWSAPI_BASE_URL.to_string()),
            openai_key: non_empty_var("OPENAI_KEY").or_else(|| non_empty_var("OPENAI_API_KEY")),
            openai_model: non_empty_var("OPENAI_MODEL")
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            openai_base_url: non_empty_var("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            smtp: SmtpSettings {
                host: non_empty_var("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
                port,
                username: non_empty_var("SMTP_USER"),
                password: non_empty_var("SMTP_PASS"),
                recipient: non_empty_var("TO_EMAIL"),
            },
        })
    }

    fn try_load_dotenv() {
        // Try locations in order of preference:

        // 1. Current directory (for development)
        if dotenvy::dotenv().is_ok() {
            return;
        }

        // 2. ~/.config/news-digest/.env (standard config location)
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("news-digest").join(".env");
            if config_path.exists() && dotenvy::from_path(&config_path).is_ok() {
                return;
            }
        }

        // 3. ~/.env (home directory)
        if let Some(home_dir) = dirs::home_dir() {
            let home_path = home_dir.join(".env");
            if home_path.exists() {
                let _ = dotenvy::from_path(&home_path);
            }
        }

        // If none found, that's okay - environment variables might be set system-wide
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// A named category and the keywords that put an item into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
    pub keywords: Vec<String>,
}

impl Topic {
    pub fn new(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Topics, sources and knobs for one deployment.
///
/// Loaded once at startup and only ever borrowed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestConfig {
    pub topics: Vec<Topic>,
    pub feeds: Vec<String>,
    /// Trailing window for search queries and the empty-topic notice
    pub recency_days: u32,
    pub page_size: u32,
    pub language: String,
    /// Items listed in each summarization prompt
    pub max_items_per_topic: usize,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            topics: default_topics(),
            feeds: default_feeds(),
            recency_days: 7,
            page_size: 25,
            language: "pt".to_string(),
            max_items_per_topic: 6,
        }
    }
}

impl DigestConfig {
    /// Read a JSON config file; fields left out keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: DigestConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if config.topics.is_empty() {
            anyhow::bail!("Config file {} defines no topics", path.display());
        }

        Ok(config)
    }

    pub fn topic_names(&self) -> Vec<&str> {
        self.topics.iter().map(|t| t.name.as_str()).collect()
    }
}

fn default_topics() -> Vec<Topic> {
    vec![
        Topic::new(
            "Marketing",
            &[
                "marketing digital",
                "performance marketing",
                "ads",
                "growth",
                "copywriting",
                "CAC",
                "ROI",
                "criativo",
            ],
        ),
        Topic::new(
            "IA",
            &[
                "inteligência artificial",
                "machine learning",
                "IA",
                "LLM",
                "GPT",
                "openai",
                "modelo generativo",
            ],
        ),
        Topic::new(
            "Tecnologia",
            &[
                "tecnologia",
                "startup",
                "software",
                "cloud",
                "saas",
                "github",
                "cibersegurança",
                "big tech",
            ],
        ),
        Topic::new(
            "Mercado Imobiliário",
            &[
                "imobiliário",
                "mercado imobiliário",
                "imóveis",
                "construtora",
                "loteamento",
                "incorporadora",
                "aluguel",
                "locação",
            ],
        ),
        Topic::new(
            "Brasil",
            &[
                "Brasil",
                "economia brasileira",
                "política brasileira",
                "Selic",
                "BCB",
                "Câmara",
                "Senado",
            ],
        ),
        Topic::new(
            "Mercado Financeiro",
            &[
                "mercado financeiro",
                "bolsa",
                "renda fixa",
                "juros",
                "câmbio",
                "IPCA",
                "Ibovespa",
            ],
        ),
    ]
}

fn default_feeds() -> Vec<String> {
    [
        "https://g1.globo.com/rss/g1/economia/",
        "https://valor.globo.com/rss/",
        "https://www.infomoney.com.br/feed/",
        "https://tecnoblog.net/feed/",
        "https://canaltech.com.br/rss/",
        "https://techcrunch.com/feed/",
        "https://feeds.feedburner.com/MarketingLand",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
