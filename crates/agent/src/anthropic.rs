use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use orderflow_core::config::LlmConfig;

use crate::llm::LlmClient;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 2000;

/// Anthropic messages API client. Runs at temperature 0: extraction needs a
/// stable structured output, not variety.
pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    system: Option<String>,
}

impl AnthropicClient {
    pub fn new(config: &LlmConfig, system: Option<String>) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| anyhow!("the anthropic provider requires an API key"))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.clone().unwrap_or_else(|| ANTHROPIC_API_URL.to_string()),
            model: config.model.clone(),
            system,
        })
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "temperature": 0,
            "messages": [
                { "role": "user", "content": [{ "type": "text", "text": prompt }] }
            ],
        });
        if let Some(system) = &self.system {
            body["system"] = serde_json::json!(system);
        }
        body
    }
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&self.request_body(prompt))
            .send()
            .await
            .context("sending messages request")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("anthropic API returned {status}: {body}"));
        }

        let payload: MessagesResponse =
            response.json().await.context("decoding messages response")?;
        if payload.content.is_empty() {
            return Err(anyhow!("anthropic response contained no content blocks"));
        }
        Ok(payload.content.into_iter().map(|block| block.text).collect())
    }
}
