use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::types::{Completion, CompletionRequest, LlmClient, LlmConfig};
use crate::telemetry::add_metric;

/// Version header required by the Messages API
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Client for the Anthropic Messages API
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    /// Configuration for the client
    config: LlmConfig,

    /// HTTP client for making requests
    client: Client,
}

/// Request body for `POST /v1/messages`
#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ApiMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: String,
    content: &'a str,
}

/// Response from the Messages API
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    model: Option<String>,
    content: Vec<ContentBlock>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: Option<u32>,
    output_tokens: Option<u32>,
}

impl AnthropicClient {
    /// Create a new client; fails when no API key is configured
    pub fn new(config: LlmConfig, timeout: std::time::Duration) -> Result<Self> {
        if config.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(anyhow!("ANTHROPIC_API_KEY not found in configuration or environment"));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: CompletionRequest) -> Result<Completion> {
        let start = std::time::Instant::now();
        let body = MessagesRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            messages: request
                .messages
                .iter()
                .map(|m| ApiMessage {
                    role: m.role.to_string(),
                    content: &m.content,
                })
                .collect(),
            temperature: request.temperature,
        };

        let url = format!("{}/v1/messages", self.config.api_url.trim_end_matches('/'));
        debug!("Sending completion request to {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", self.config.api_key.as_deref().unwrap_or_default())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!("Anthropic API error {}: {}", status, text);
            return Err(anyhow!("Anthropic API returned {}: {}", status, text));
        }

        let parsed: MessagesResponse = response.json().await?;
        let content = parsed
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        add_metric(
            "llm_completion_duration_ms",
            start.elapsed().as_millis() as f64,
            &[("model", request.model.clone())],
        );

        Ok(Completion {
            content,
            model: parsed.model,
            prompt_tokens: parsed.usage.as_ref().and_then(|u| u.input_tokens),
            completion_tokens: parsed.usage.as_ref().and_then(|u| u.output_tokens),
        })
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_requires_api_key() {
        assert!(AnthropicClient::new(LlmConfig::default(), Duration::from_secs(5)).is_err());

        let config = LlmConfig {
            api_key: Some("key".to_string()),
            ..LlmConfig::default()
        };
        assert!(AnthropicClient::new(config, Duration::from_secs(5)).is_ok());
    }
}
