use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use validator::Validate;

use crate::error::{Error, ErrorKind};
use crate::publisher::PublishResult;
use crate::workflow::{ApprovalStatus, Stage, WorkflowId, WorkflowState, WorkflowStatus};

/// Request to generate a post
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenerateRequest {
    /// Topic of the post, at most 500 characters
    #[validate(length(min = 1, max = 500))]
    pub topic: String,
}

impl GenerateRequest {
    /// Create a new request
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
        }
    }
}

/// Response to a generate request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Identifier of the new workflow
    pub workflow_id: String,
    /// Generated post
    pub content: String,
    /// Length of the post in characters
    pub chars: usize,
    /// Workflow status, always `pending_approval`
    pub status: WorkflowStatus,
    /// Human readable hint
    pub message: String,
}

/// A reviewer decision
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApproveRequest {
    /// Identifier of the workflow
    #[validate(length(min = 1))]
    pub workflow_id: String,
    /// Whether the post should be published
    pub approved: bool,
}

impl ApproveRequest {
    /// Create a new decision request
    pub fn new(workflow_id: impl Into<String>, approved: bool) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            approved,
        }
    }
}

/// Response to a decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproveResponse {
    /// Identifier of the workflow
    pub workflow_id: String,
    /// Workflow status after the decision
    pub status: WorkflowStatus,
    /// Outcome of the publish attempt, when approved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_result: Option<PublishResult>,
    /// Human readable summary
    pub message: String,
}

/// Externally visible snapshot of a workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowView {
    /// Identifier of the workflow
    pub workflow_id: String,
    /// Submitted topic
    pub topic: String,
    /// Generated post
    pub content: String,
    /// Derived status
    pub status: WorkflowStatus,
    /// Reviewer decision
    pub approval_status: ApprovalStatus,
    /// State machine position
    pub stage: Stage,
    /// Outcome of the publish attempt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_result: Option<PublishResult>,
    /// Transition annotations
    pub history: Vec<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last change
    pub updated_at: DateTime<Utc>,
    /// Decision time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<DateTime<Utc>>,
}

impl WorkflowView {
    /// Snapshot `state` stored under `id`
    pub fn new(id: &WorkflowId, state: &WorkflowState) -> Self {
        Self {
            workflow_id: id.to_string(),
            topic: state.topic().to_string(),
            content: state.content().to_string(),
            status: state.status(),
            approval_status: state.approval_status(),
            stage: state.stage(),
            publish_result: state.publish_result().cloned(),
            history: state.history().to_vec(),
            created_at: state.created_at(),
            updated_at: state.updated_at(),
            decided_at: state.decided_at(),
        }
    }
}

/// Workflows waiting for a reviewer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingResponse {
    /// Number of pending workflows
    pub count: usize,
    /// Pending workflows keyed by identifier
    pub posts: BTreeMap<String, WorkflowView>,
}

/// Liveness report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `healthy` when the service answers
    pub status: String,
    /// Number of stored workflows
    pub workflows: usize,
}

/// Failure reported at the boundary
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct ApiError {
    /// HTTP-equivalent status code
    pub status_code: u16,
    /// Stable error kind
    pub kind: ErrorKind,
    /// Human readable detail
    pub message: String,
}

impl ApiError {
    /// Build a boundary error of the given kind
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let status_code = match kind {
            ErrorKind::NotFound => 404,
            ErrorKind::AlreadyDecided => 409,
            ErrorKind::InvalidRequest => 400,
            ErrorKind::GenerationFailed | ErrorKind::Config | ErrorKind::Storage => 500,
        };
        Self {
            status_code,
            kind,
            message: message.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::new(err.kind(), err.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::new(ErrorKind::InvalidRequest, err.to_string())
    }
}
