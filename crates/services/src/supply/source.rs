use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SupplyError;

/// Anything that turns an instruction into free text.
#[async_trait]
pub trait GenerationSource: Send + Sync {
    /// # Errors
    ///
    /// Returns `SupplyError` when the source cannot be reached or answers with
    /// nothing usable.
    async fn generate(&self, prompt: &str) -> Result<String, SupplyError>;
}

pub const DEFAULT_BASE_URL: &str = "https://api.mistral.ai/v1";
pub const DEFAULT_MODEL: &str = "mistral-small-latest";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
    pub temperature: f32,
}

impl GeneratorConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            temperature: 0.7,
        }
    }

    /// Reads `DRILL_AI_*` variables through `lookup`. `None` without an API key.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let api_key = lookup("DRILL_AI_API_KEY")?;
        if api_key.trim().is_empty() {
            return None;
        }
        let mut config = Self::new(api_key.trim());
        if let Some(base_url) = lookup("DRILL_AI_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(model) = lookup("DRILL_AI_MODEL") {
            config.model = model;
        }
        if let Some(secs) = lookup("DRILL_AI_TIMEOUT_SECS")
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
        {
            config.timeout = Duration::from_secs(secs);
        }
        Some(config)
    }
}

/// OpenAI-style `/chat/completions` client.
#[derive(Clone)]
pub struct ChatCompletionsSource {
    client: Client,
    config: Option<GeneratorConfig>,
}

impl ChatCompletionsSource {
    /// A source built from `None` answers every request with `SupplyError::Disabled`.
    ///
    /// # Errors
    ///
    /// Returns `SupplyError::Unreachable` if the HTTP client cannot be built.
    pub fn new(config: Option<GeneratorConfig>) -> Result<Self, SupplyError> {
        let timeout = config
            .as_ref()
            .map_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS), |c| c.timeout);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SupplyError::Unreachable(e.to_string()))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl GenerationSource for ChatCompletionsSource {
    async fn generate(&self, prompt: &str) -> Result<String, SupplyError> {
        let config = self.config.as_ref().ok_or(SupplyError::Disabled)?;

        let url = format!(
            "{}/chat/completions",
            config.base_url.trim_end_matches('/')
        );
        let payload = ChatRequest {
            model: config.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.to_string(),
            }],
            temperature: config.temperature,
        };

        debug!(model = %config.model, prompt_len = prompt.len(), "sending generation request");
        let response = self
            .client
            .post(url)
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SupplyError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(SupplyError::EmptyResponse)?;

        Ok(content.trim().to_string())
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_source_is_disabled() {
        let source = ChatCompletionsSource::new(None).unwrap();
        assert!(matches!(
            source.generate("anything").await.unwrap_err(),
            SupplyError::Disabled
        ));
    }

    #[test]
    fn config_defaults_point_at_mistral() {
        let config = GeneratorConfig::new("key");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, "mistral-small-latest");
        assert_eq!(config.timeout, Duration::from_secs(20));
    }

    #[test]
    fn lookup_overrides_defaults_and_ignores_bad_timeouts() {
        let config = GeneratorConfig::from_lookup(|key| match key {
            "DRILL_AI_API_KEY" => Some(" secret ".into()),
            "DRILL_AI_MODEL" => Some("open-mistral-7b".into()),
            "DRILL_AI_TIMEOUT_SECS" => Some("zero".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.model, "open-mistral-7b");
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        assert!(GeneratorConfig::from_lookup(|_| None).is_none());
        assert!(GeneratorConfig::from_lookup(|_| Some("  ".into())).is_none());
    }

    #[test]
    fn chat_response_without_content_parses() {
        let body: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant"}}]}"#).unwrap();
        assert!(body.choices[0].message.content.is_none());
    }
}
