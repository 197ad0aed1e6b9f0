//! Request coordination for the approval pipeline.
//!
//! The coordinator is the thin adapter between an external boundary (HTTP,
//! console) and the [`WorkflowStore`]. It validates requests, shapes responses
//! and maps store failures onto [`ApiError`]s. It holds no state of its own.

mod types;

pub use types::{
    ApiError, ApproveRequest, ApproveResponse, GenerateRequest, GenerateResponse,
    HealthResponse, PendingResponse, WorkflowView,
};

use std::sync::Arc;
use tracing::{debug, instrument};
use validator::Validate;

use crate::config::Settings;
use crate::error::{Error, ErrorKind, Result};
use crate::workflow::{WorkflowEngine, WorkflowEngineConfig, WorkflowId, WorkflowStatus, WorkflowStore};
use crate::{generator, publisher};

/// Adapter exposing the store operations to an external boundary
#[derive(Debug, Clone)]
pub struct RequestCoordinator {
    store: Arc<WorkflowStore>,
}

impl RequestCoordinator {
    /// Create a coordinator over `store`
    pub fn new(store: WorkflowStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Wire generator, publisher, engine and an in-memory store from settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.validate()?;

        let generator = generator::from_settings(&settings.generator)?;
        let publisher = publisher::from_settings(&settings.publisher)?;
        let engine = WorkflowEngine::new(
            generator,
            publisher,
            Some(WorkflowEngineConfig {
                generate_timeout_secs: settings.generator.timeout_secs,
                publish_timeout_secs: settings.publisher.timeout_secs,
            }),
        );

        Ok(Self::new(WorkflowStore::in_memory(engine)))
    }

    /// The underlying store
    pub fn store(&self) -> &WorkflowStore {
        &self.store
    }

    /// Generate a new post and park it for approval
    #[instrument(skip(self, request))]
    pub async fn generate(
        &self,
        request: GenerateRequest,
    ) -> std::result::Result<GenerateResponse, ApiError> {
        request.validate()?;
        let topic = request.topic.trim();
        if topic.is_empty() {
            return Err(Error::InvalidRequest("topic must not be blank".to_string()).into());
        }

        let (id, state) = self.store.create(topic).await?;

        Ok(GenerateResponse {
            workflow_id: id.to_string(),
            content: state.content().to_string(),
            chars: state.content().chars().count(),
            status: state.status(),
            message: "Post generated. Call /approve to publish.".to_string(),
        })
    }

    /// Approve or reject a pending post
    #[instrument(skip(self, request), fields(workflow_id = %request.workflow_id, approved = request.approved))]
    pub async fn approve(
        &self,
        request: ApproveRequest,
    ) -> std::result::Result<ApproveResponse, ApiError> {
        request.validate()?;
        let id = parse_workflow_id(&request.workflow_id)?;

        let state = self.store.decide(&id, request.approved).await?;
        let status = state.status();
        let message = match status {
            WorkflowStatus::Published => "Post published successfully!",
            WorkflowStatus::Failed => "Publishing failed",
            WorkflowStatus::Rejected => "Post rejected by user",
            WorkflowStatus::PendingApproval | WorkflowStatus::Publishing => "Decision recorded",
        };

        Ok(ApproveResponse {
            workflow_id: id.to_string(),
            status,
            publish_result: state.publish_result().cloned(),
            message: message.to_string(),
        })
    }

    /// Look up a workflow
    pub async fn status(&self, workflow_id: &str) -> std::result::Result<WorkflowView, ApiError> {
        let id = parse_workflow_id(workflow_id)?;
        let state = self.store.get(&id).await?;
        Ok(WorkflowView::new(&id, &state))
    }

    /// List workflows waiting for a reviewer
    pub async fn pending(&self) -> std::result::Result<PendingResponse, ApiError> {
        let pending = self.store.list_pending().await?;
        let posts: std::collections::BTreeMap<_, _> = pending
            .iter()
            .map(|(id, state)| (id.to_string(), WorkflowView::new(id, state)))
            .collect();

        debug!("{} workflows pending", posts.len());
        Ok(PendingResponse {
            count: posts.len(),
            posts,
        })
    }

    /// Liveness report
    pub async fn health(&self) -> std::result::Result<HealthResponse, ApiError> {
        Ok(HealthResponse {
            status: "healthy".to_string(),
            workflows: self.store.len().await?,
        })
    }
}

/// Identifiers that do not parse can never have been issued, so they are reported as not found
fn parse_workflow_id(raw: &str) -> std::result::Result<WorkflowId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::new(ErrorKind::NotFound, Error::NotFound(raw.to_string()).to_string()))
}
