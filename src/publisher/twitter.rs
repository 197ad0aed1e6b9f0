use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

use super::{PublishResult, Publisher};
use crate::error::{Error, Result};
use crate::telemetry::add_metric;

/// Publisher for the Twitter/X v2 API
#[derive(Debug, Clone)]
pub struct TwitterPublisher {
    /// Base URL of the API
    api_url: String,

    /// OAuth 2.0 user-context bearer token
    bearer_token: String,

    /// Destination identifier reported in results
    platform: String,

    /// HTTP client for making requests
    client: Client,
}

/// Response of `POST /2/tweets`
#[derive(Debug, Deserialize)]
struct CreateTweetResponse {
    data: CreatedTweet,
}

#[derive(Debug, Deserialize)]
struct CreatedTweet {
    id: String,
}

impl TwitterPublisher {
    /// Create a new publisher
    pub fn new(
        api_url: impl Into<String>,
        bearer_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            bearer_token: bearer_token.into(),
            platform: super::DEFAULT_PLATFORM.to_string(),
            client,
        })
    }

    /// Report results under a different platform name
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }
}

#[async_trait]
impl Publisher for TwitterPublisher {
    #[instrument(skip(self, content), fields(chars = content.chars().count()))]
    async fn publish(&self, content: &str) -> PublishResult {
        let url = format!("{}/2/tweets", self.api_url);
        debug!("Posting to {}", url);

        let response = match self
            .client
            .post(&url)
            .bearer_auth(&self.bearer_token)
            .json(&json!({ "text": content }))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to reach Twitter API: {}", e);
                add_metric("publish_failure", 1.0, &[("platform", self.platform().to_string())]);
                return PublishResult::failure(self.platform(), e.to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Twitter API returned {}: {}", status, body);
            add_metric("publish_failure", 1.0, &[("platform", self.platform().to_string())]);
            return PublishResult::failure(self.platform(), format!("HTTP {}: {}", status, body));
        }

        match response.json::<CreateTweetResponse>().await {
            Ok(created) => {
                info!("Published tweet {}", created.data.id);
                let url = format!("https://twitter.com/user/status/{}", created.data.id);
                PublishResult::success(self.platform(), created.data.id, url)
            }
            Err(e) => PublishResult::failure(
                self.platform(),
                format!("Invalid response from Twitter API: {}", e),
            ),
        }
    }

    fn platform(&self) -> &str {
        &self.platform
    }
}
