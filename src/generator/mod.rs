//! Content generation from a topic.
//!
//! Two generators are provided: [`TemplateGenerator`] picks one of a set of
//! canned posts, and [`LlmGenerator`] asks an [`LlmClient`] to write one. Both
//! keep the output within the platform's character limit.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::{GeneratorMode, GeneratorSettings};
use crate::error::{Error, Result};
use crate::llm::{CompletionRequest, LlmClient};

/// Character limit of a post on the default platform
pub const MAX_POST_CHARS: usize = 280;

/// Failure of a [`ContentGenerator`]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// The backing provider failed
    #[error("provider error: {0}")]
    Provider(String),

    /// The provider returned nothing usable
    #[error("generator returned empty content")]
    EmptyContent,

    /// The generator did not answer within the deadline
    #[error("generation timed out after {0}s")]
    Timeout(u64),
}

/// Produces post text from a topic
#[async_trait]
pub trait ContentGenerator: Send + Sync + fmt::Debug {
    /// Generate a post about `topic`
    async fn generate(&self, topic: &str) -> std::result::Result<String, GenerationError>;
}

/// Cut `text` to at most `max_chars` characters, marking the cut with `...`
pub fn truncate_post(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars <= 3 {
        return text.chars().take(max_chars).collect();
    }

    let mut truncated: String = text.chars().take(max_chars - 3).collect();
    truncated.push_str("...");
    truncated
}

/// Generator backed by canned templates; needs no external service
#[derive(Debug, Clone)]
pub struct TemplateGenerator {
    max_chars: usize,
}

impl Default for TemplateGenerator {
    fn default() -> Self {
        Self::new(MAX_POST_CHARS)
    }
}

impl TemplateGenerator {
    /// Create a template generator with the given character limit
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    /// All candidate posts for a topic
    pub fn candidates(topic: &str) -> Vec<String> {
        vec![
            format!("🚀 Excited about {topic}! This is transforming how we work. #AI #Tech #Innovation"),
            format!("💡 Hot take: {topic} is the future. Here's why it matters... #Technology"),
            format!("📊 Just discovered {topic}. The implications are huge! #TechNews #AI"),
            format!("🔥 {topic} is going to change everything. Thread 🧵 #Innovation"),
            format!("⚡ Breaking down {topic} in simple terms. #TechTrends"),
        ]
    }

    fn pick(&self, topic: &str) -> String {
        let candidates = Self::candidates(topic);
        let post = candidates
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_default();
        truncate_post(&post, self.max_chars)
    }
}

#[async_trait]
impl ContentGenerator for TemplateGenerator {
    async fn generate(&self, topic: &str) -> std::result::Result<String, GenerationError> {
        let post = self.pick(topic);
        if post.trim().is_empty() {
            return Err(GenerationError::EmptyContent);
        }
        Ok(post)
    }
}

/// Generator that asks an LLM to write the post
#[derive(Debug)]
pub struct LlmGenerator<C: LlmClient> {
    client: C,
    platform: String,
    max_chars: usize,
}

impl<C: LlmClient> LlmGenerator<C> {
    /// Create a generator writing for `platform`
    pub fn new(client: C, platform: impl Into<String>, max_chars: usize) -> Self {
        Self {
            client,
            platform: platform.into(),
            max_chars,
        }
    }

    /// The prompt sent for a topic
    pub fn build_prompt(&self, topic: &str) -> String {
        format!(
            "Create a {platform} post about: {topic}\n\n\
             Requirements:\n\
             - Engaging and authentic\n\
             - Include relevant hashtags\n\
             - Keep it concise ({max} chars for {platform})\n\
             - Professional yet friendly tone\n\n\
             Return ONLY the post text, nothing else.",
            platform = self.platform,
            topic = topic,
            max = self.max_chars,
        )
    }
}

#[async_trait]
impl<C: LlmClient> ContentGenerator for LlmGenerator<C> {
    #[instrument(skip(self), fields(platform = %self.platform))]
    async fn generate(&self, topic: &str) -> std::result::Result<String, GenerationError> {
        let request = CompletionRequest::single_turn(self.client.config(), self.build_prompt(topic));

        let completion = self.client.complete(request).await.map_err(|e| {
            warn!("Error generating content: {}", e);
            GenerationError::Provider(e.to_string())
        })?;

        let text = completion.content.trim();
        if text.is_empty() {
            return Err(GenerationError::EmptyContent);
        }

        debug!(
            prompt_tokens = ?completion.prompt_tokens,
            completion_tokens = ?completion.completion_tokens,
            "Generated post"
        );
        Ok(truncate_post(text, self.max_chars))
    }
}

/// Build the generator selected by the settings
pub fn from_settings(settings: &GeneratorSettings) -> Result<Arc<dyn ContentGenerator>> {
    match settings.mode {
        GeneratorMode::Template => Ok(Arc::new(TemplateGenerator::new(settings.max_chars))),
        #[cfg(feature = "anthropic")]
        GeneratorMode::Llm => {
            let client = crate::llm::AnthropicClient::new(settings.llm.clone(), settings.timeout())
                .map_err(|e| Error::Config(e.to_string()))?;
            Ok(Arc::new(LlmGenerator::new(
                client,
                &settings.platform,
                settings.max_chars,
            )))
        }
        #[cfg(not(feature = "anthropic"))]
        GeneratorMode::Llm => Err(Error::Config(
            "llm generator requires the `anthropic` feature".to_string(),
        )),
    }
}
