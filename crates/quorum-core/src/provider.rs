use std::time::Duration;

use async_trait::async_trait;

use crate::error::{QuorumError, Result};

/// The two capability tiers the analyzer draws on: a fast/cheap model for
/// triage and a slow/expensive model for deep analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    Fast,
    Deep,
}

#[derive(Clone, Debug, Default)]
pub enum Provider {
    #[default]
    Grok,
    Openai,
    Gemini,
}

pub struct ProviderConfig {
    pub api_url: &'static str,
    pub env_var: &'static str,
}

impl Provider {
    pub fn config(&self) -> ProviderConfig {
        match self {
            Provider::Grok => ProviderConfig {
                api_url: "https://api.x.ai/v1/chat/completions",
                env_var: "XAI_API_KEY",
            },
            Provider::Openai => ProviderConfig {
                api_url: "https://api.openai.com/v1/chat/completions",
                env_var: "OPENAI_API_KEY",
            },
            Provider::Gemini => ProviderConfig {
                api_url: "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions",
                env_var: "GEMINI_API_KEY",
            },
        }
    }

    pub fn model(&self, tier: ModelTier) -> &'static str {
        match (self, tier) {
            (Provider::Grok, ModelTier::Fast) => "grok-4-fast",
            (Provider::Grok, ModelTier::Deep) => "grok-4",
            (Provider::Openai, ModelTier::Fast) => "gpt-5-mini",
            (Provider::Openai, ModelTier::Deep) => "gpt-5.1",
            (Provider::Gemini, ModelTier::Fast) => "gemini-3-flash",
            (Provider::Gemini, ModelTier::Deep) => "gemini-3-pro",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Provider::Grok => "Grok",
            Provider::Openai => "OpenAI",
            Provider::Gemini => "Gemini",
        }
    }

    /// Validate that the API key is set for this provider
    pub fn validate_api_key(&self) -> Result<String> {
        let config = self.config();
        std::env::var(config.env_var).map_err(|_| QuorumError::MissingApiKey {
            env_var: config.env_var.to_string(),
        })
    }
}

/// One opaque model capability: submit a prompt, get raw text back or fail.
/// The analyzer never sees transport details behind this seam.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

/// OpenAI-style chat-completions client backing one tier.
pub struct ChatModel {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl ChatModel {
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

    pub fn for_tier(provider: &Provider, tier: ModelTier) -> Result<Self> {
        let config = provider.config();
        let api_key = provider.validate_api_key()?;
        let client = reqwest::Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            api_url: config.api_url.to_string(),
            api_key,
            model: provider.model(tier).to_string(),
        })
    }
}

#[async_trait]
impl LanguageModel for ChatModel {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.api_url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&serde_json::json!({
                "model": self.model,
                "messages": [
                    {
                        "role": "system",
                        "content": system_prompt,
                    },
                    {
                        "role": "user",
                        "content": user_prompt,
                    },
                ],
                "temperature": 0.3,
            }))
            .send()
            .await?
            .json::<serde_json::Value>()
            .await?;

        let content = response["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| QuorumError::ModelResponse {
                reason: format!("Invalid API response: {:?}", response),
            })?;

        Ok(content.to_string())
    }
}
