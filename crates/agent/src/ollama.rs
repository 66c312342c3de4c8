use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use orderflow_core::config::LlmConfig;

use crate::llm::LlmClient;

const OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Local Ollama client using the non-streaming `/api/generate` endpoint.
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    system: Option<String>,
}

impl OllamaClient {
    pub fn new(config: &LlmConfig, system: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.clone().unwrap_or_else(|| OLLAMA_BASE_URL.to_string()),
            model: config.model.clone(),
            system,
        })
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": { "temperature": 0 },
        });
        if let Some(system) = &self.system {
            body["system"] = serde_json::json!(system);
        }
        body
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(&self.request_body(prompt))
            .send()
            .await
            .context("sending generate request")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("ollama returned {status}: {body}"));
        }

        let payload: GenerateResponse =
            response.json().await.context("decoding generate response")?;
        Ok(payload.response)
    }
}

#[cfg(test)]
mod tests {
    use orderflow_core::config::{LlmConfig, LlmProvider};

    use super::OllamaClient;

    #[test]
    fn the_request_body_pins_temperature_zero() {
        let config = LlmConfig {
            provider: LlmProvider::Ollama,
            api_key: None,
            base_url: None,
            model: "llama3.1".to_string(),
            timeout_secs: 30,
        };
        let client = OllamaClient::new(&config, Some("system text".to_string())).expect("client");
        let body = client.request_body("user text");

        assert_eq!(body["options"]["temperature"], 0);
        assert_eq!(body["stream"], false);
        assert_eq!(body["system"], "system text");
    }
}
