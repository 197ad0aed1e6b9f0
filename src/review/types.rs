use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::coordinator::WorkflowView;

/// A post presented to a human reviewer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRequest {
    /// Workflow the post belongs to
    pub workflow_id: String,

    /// Topic the post was generated for
    pub topic: String,

    /// The generated post
    pub content: String,

    /// Optional timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

impl ReviewRequest {
    /// Create a new review request
    pub fn new(
        workflow_id: impl Into<String>,
        topic: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            topic: topic.into(),
            content: content.into(),
            timeout_seconds: None,
        }
    }

    /// Add a timeout to the request
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    /// Get the timeout as a Duration
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

impl From<&WorkflowView> for ReviewRequest {
    fn from(view: &WorkflowView) -> Self {
        Self::new(&view.workflow_id, &view.topic, &view.content)
    }
}

/// What the reviewer decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewOutcome {
    /// Publish the post
    Approve,
    /// Discard the post
    Reject,
    /// Leave the post pending
    Skip,
}

impl ReviewOutcome {
    /// The approval flag to submit, if any
    pub fn approved(self) -> Option<bool> {
        match self {
            ReviewOutcome::Approve => Some(true),
            ReviewOutcome::Reject => Some(false),
            ReviewOutcome::Skip => None,
        }
    }
}

/// Parse a reviewer's answer
pub fn parse_verdict(input: &str) -> Option<ReviewOutcome> {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" | "approve" => Some(ReviewOutcome::Approve),
        "n" | "no" | "reject" => Some(ReviewOutcome::Reject),
        "s" | "skip" => Some(ReviewOutcome::Skip),
        _ => None,
    }
}

/// A trait for review handlers
#[async_trait]
pub trait ReviewHandler: Send + Sync {
    /// Ask for a verdict on a single post
    async fn review(&self, request: ReviewRequest) -> anyhow::Result<ReviewOutcome>;
}
