use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument, warn, Instrument};

use super::engine::WorkflowEngine;
use super::repository::{InMemoryWorkflowRepository, WorkflowRepository};
use super::state::{Decision, WorkflowId, WorkflowState};
use crate::error::{Error, Result};
use crate::telemetry::add_metric;

/// Creates, looks up and advances workflows.
///
/// Collaborator calls (generation, publishing) run outside the repository's
/// critical section; only the state read/transition/write is serialized.
#[derive(Debug, Clone)]
pub struct WorkflowStore {
    engine: WorkflowEngine,
    repository: Arc<dyn WorkflowRepository>,
}

impl WorkflowStore {
    /// Create a store over the given repository
    pub fn new(engine: WorkflowEngine, repository: Arc<dyn WorkflowRepository>) -> Self {
        Self { engine, repository }
    }

    /// Create a store backed by process memory
    pub fn in_memory(engine: WorkflowEngine) -> Self {
        Self::new(engine, Arc::new(InMemoryWorkflowRepository::new()))
    }

    /// Generate content for `topic` and persist the workflow at the approval step.
    ///
    /// Nothing is persisted when generation fails.
    #[instrument(skip(self))]
    pub async fn create(&self, topic: &str) -> Result<(WorkflowId, WorkflowState)> {
        let state = match self.engine.start(topic).await {
            Ok(state) => state,
            Err(err) => {
                warn!("Workflow creation failed: {}", err);
                add_metric("workflow_create_failed", 1.0, &[("kind", err.kind().to_string())]);
                return Err(err);
            }
        };

        let id = WorkflowId::new();
        self.repository.insert(id, state.clone()).await?;

        info!(workflow_id = %id, "Workflow created, waiting for approval");
        add_metric("workflow_created", 1.0, &[]);
        Ok((id, state))
    }

    /// Latest checkpoint of a workflow
    pub async fn get(&self, id: &WorkflowId) -> Result<WorkflowState> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Record a reviewer decision and drive the workflow to its terminal stage.
    ///
    /// Fails with [`Error::AlreadyDecided`] for any workflow that is no longer
    /// pending, so content is published at most once. Once the decision is
    /// recorded the rest of the run happens on its own task, so the workflow
    /// still reaches its terminal checkpoint if the caller is dropped.
    #[instrument(skip(self, id), fields(workflow_id = %id))]
    pub async fn decide(&self, id: &WorkflowId, approved: bool) -> Result<WorkflowState> {
        let decision = Decision::from(approved);
        let decided = self.repository.record_decision(id, decision).await?;
        info!(?decision, "Decision recorded");

        // only the caller that won the decision gets here, so the checkpoint below is uncontended
        let engine = self.engine.clone();
        let repository = Arc::clone(&self.repository);
        let workflow_id = *id;
        let continuation = tokio::spawn(
            async move {
                let finished = engine.run(decided).await?;
                repository.save(&workflow_id, finished.clone()).await?;
                Ok::<_, Error>(finished)
            }
            .in_current_span(),
        );

        let finished = continuation
            .await
            .map_err(|e| Error::Storage(format!("workflow run for {} aborted: {}", id, e)))??;

        add_metric(
            "workflow_decided",
            1.0,
            &[("status", finished.status().to_string())],
        );
        Ok(finished)
    }

    /// All workflows still waiting for a decision
    pub async fn list_pending(&self) -> Result<BTreeMap<WorkflowId, WorkflowState>> {
        self.repository.list_pending().await
    }

    /// Number of stored workflows
    pub async fn len(&self) -> Result<usize> {
        self.repository.len().await
    }

    /// Whether no workflow was created yet
    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }
}
