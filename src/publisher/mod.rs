//! Publishing of approved content.
//!
//! A [`Publisher`] never fails past its boundary: transport and platform
//! failures are encoded in the returned [`PublishResult`].

#[cfg(feature = "twitter")]
pub mod twitter;

#[cfg(feature = "twitter")]
pub use twitter::TwitterPublisher;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

use crate::config::{PublisherMode, PublisherSettings};
use crate::error::{Error, Result};

/// Platform identifier used when none is configured
pub const DEFAULT_PLATFORM: &str = "twitter";

/// First post id handed out by [`DryRunPublisher`]
const FIRST_MOCK_POST_ID: u64 = 12345;

/// Outcome of a publish attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishResult {
    /// Whether the content was delivered
    pub success: bool,

    /// Destination identifier
    pub platform: String,

    /// Platform id of the created post (present iff success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<String>,

    /// Public URL of the created post (present iff success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Failure description (present iff not success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Whether the result was fabricated without contacting the platform
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dry_run: bool,
}

impl PublishResult {
    /// A successful delivery
    pub fn success(
        platform: impl Into<String>,
        post_id: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            success: true,
            platform: platform.into(),
            post_id: Some(post_id.into()),
            url: Some(url.into()),
            error: None,
            dry_run: false,
        }
    }

    /// A failed delivery
    pub fn failure(platform: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            platform: platform.into(),
            post_id: None,
            url: None,
            error: Some(error.into()),
            dry_run: false,
        }
    }

    /// Mark the result as fabricated
    pub fn into_dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Short human readable summary, used in workflow history
    pub fn summary(&self) -> String {
        if self.success {
            format!(
                "{} post {}",
                self.platform,
                self.url
                    .as_deref()
                    .or(self.post_id.as_deref())
                    .unwrap_or("(no id)")
            )
        } else {
            format!(
                "{}: {}",
                self.platform,
                self.error.as_deref().unwrap_or("unknown error")
            )
        }
    }
}

/// Delivers approved content to a destination
#[async_trait]
pub trait Publisher: Send + Sync + fmt::Debug {
    /// Attempt delivery of `content`
    async fn publish(&self, content: &str) -> PublishResult;

    /// Destination identifier
    fn platform(&self) -> &str;
}

/// Publisher that fabricates results without contacting any destination
#[derive(Debug)]
pub struct DryRunPublisher {
    platform: String,
    failure: Option<String>,
    next_post_id: AtomicU64,
}

impl Default for DryRunPublisher {
    fn default() -> Self {
        Self::new(DEFAULT_PLATFORM)
    }
}

impl DryRunPublisher {
    /// Create a dry-run publisher that always succeeds
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            failure: None,
            next_post_id: AtomicU64::new(FIRST_MOCK_POST_ID),
        }
    }

    /// Create a dry-run publisher that simulates a platform failure
    pub fn failing(error: impl Into<String>) -> Self {
        Self {
            failure: Some(error.into()),
            ..Self::default()
        }
    }
}

#[async_trait]
impl Publisher for DryRunPublisher {
    async fn publish(&self, content: &str) -> PublishResult {
        let preview: String = content.chars().take(50).collect();
        info!(platform = %self.platform, "[DRY RUN] Would publish: {}...", preview);

        if let Some(error) = &self.failure {
            return PublishResult::failure(&self.platform, error.clone()).into_dry_run();
        }

        let post_id = format!(
            "mock_{}",
            self.next_post_id.fetch_add(1, Ordering::Relaxed)
        );
        let url = format!("https://twitter.com/user/status/{}", post_id);
        PublishResult::success(&self.platform, post_id, url).into_dry_run()
    }

    fn platform(&self) -> &str {
        &self.platform
    }
}

/// Build the publisher selected by the settings
pub fn from_settings(settings: &PublisherSettings) -> Result<Arc<dyn Publisher>> {
    match settings.mode {
        PublisherMode::DryRun => Ok(Arc::new(DryRunPublisher::new(&settings.platform))),
        #[cfg(feature = "twitter")]
        PublisherMode::Twitter => {
            let token = settings.bearer_token.clone().ok_or_else(|| {
                Error::Config("twitter publisher requires a bearer token".to_string())
            })?;
            Ok(Arc::new(
                TwitterPublisher::new(&settings.api_url, token, settings.timeout())?
                    .with_platform(&settings.platform),
            ))
        }
        #[cfg(not(feature = "twitter"))]
        PublisherMode::Twitter => Err(Error::Config(
            "twitter publisher requires the `twitter` feature".to_string(),
        )),
    }
}
