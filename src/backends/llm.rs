//! Remote LLM backends for the completion message.
//!
//! One request, no streaming, no retries. Any non-2xx status or missing
//! text field is a `ProviderError`; the cascade decides what happens next.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::{json, Value};
use tracing::debug;

use super::TextBackend;
use crate::config::LlmConfig;
use crate::error::ProviderError;

const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct OpenAiChat {
    client: Client,
    url: String,
    model: String,
    api_key: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiChat {
    pub fn new(client: Client, config: &LlmConfig, api_key: &str) -> Self {
        Self {
            client,
            url: format!("{}/v1/chat/completions", config.openai_base_url.trim_end_matches('/')),
            model: config.openai_model.clone(),
            api_key: api_key.to_string(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

#[async_trait]
impl TextBackend for OpenAiChat {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
        });

        debug!("Sending completion prompt to OpenAI model '{}'", self.model);
        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let data = json_body(resp).await?;

        data["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.trim().to_string())
            .ok_or_else(|| ProviderError::Malformed("missing choices[0].message.content".into()))
    }
}

pub struct AnthropicMessages {
    client: Client,
    url: String,
    model: String,
    api_key: String,
    max_tokens: u32,
    temperature: f32,
}

impl AnthropicMessages {
    pub fn new(client: Client, config: &LlmConfig, api_key: &str) -> Self {
        Self {
            client,
            url: format!("{}/v1/messages", config.anthropic_base_url.trim_end_matches('/')),
            model: config.anthropic_model.clone(),
            api_key: api_key.to_string(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

#[async_trait]
impl TextBackend for AnthropicMessages {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "messages": [{"role": "user", "content": prompt}],
        });

        debug!("Sending completion prompt to Anthropic model '{}'", self.model);
        let resp = self
            .client
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;
        let data = json_body(resp).await?;

        data["content"]
            .as_array()
            .and_then(|blocks| {
                blocks
                    .iter()
                    .find(|b| b["type"] == "text")
                    .and_then(|b| b["text"].as_str())
            })
            .map(|s| s.trim().to_string())
            .ok_or_else(|| ProviderError::Malformed("no text block in content".into()))
    }
}

async fn json_body(resp: Response) -> Result<Value, ProviderError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ProviderError::status(status.as_u16(), &body));
    }
    resp.json::<Value>()
        .await
        .map_err(|e| ProviderError::Malformed(e.to_string()))
}
