use std::env;

use anyhow::{Result, bail};

/// Settings for the OpenAI-compatible chat completion endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout: u64,
}

impl OpenAiConfig {
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            bail!("OpenAI API key is empty");
        }
        if self.base_url.trim().is_empty() {
            bail!("OpenAI base URL is empty");
        }
        if self.timeout == 0 {
            bail!("timeout must be at least 1 second");
        }
        Ok(())
    }
}

/// Settings for the Notion page-creation export.
#[derive(Debug, Clone)]
pub struct NotionConfig {
    pub token: Option<String>,
    pub parent_page_id: Option<String>,
    pub base_url: String,
}

/// Full application configuration, read from the environment exactly once.
/// Components never touch the environment themselves; values are threaded
/// to whoever needs them.
#[derive(Debug, Clone)]
pub struct Config {
    /// Present only when OPENAI_API_KEY is set; enables delegated synthesis
    pub openai: Option<OpenAiConfig>,
    /// Automation webhook target; dry-run when absent
    pub webhook_url: Option<String>,
    pub notion: NotionConfig,
}

impl Config {
    pub fn load() -> Result<Self> {
        let openai = env_opt("OPENAI_API_KEY").map(|api_key| OpenAiConfig {
            api_key,
            base_url: env_opt("OPENAI_BASE_URL")
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            model: env_opt("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
            temperature: 0.2,
            max_tokens: 1024,
            timeout: 30,
        });

        let cfg = Self {
            openai,
            webhook_url: env_opt("WEBHOOK_URL"),
            notion: NotionConfig {
                token: env_opt("NOTION_TOKEN"),
                parent_page_id: env_opt("NOTION_PARENT_PAGE_ID"),
                base_url: "https://api.notion.com".to_string(),
            },
        };

        if let Some(openai) = &cfg.openai {
            openai.validate()?;
        }
        Ok(cfg)
    }
}

/// Read an environment variable, treating empty/whitespace values as unset.
fn env_opt(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}
