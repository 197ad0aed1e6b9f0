use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tokio::sync::RwLock;

use super::state::{Decision, WorkflowId, WorkflowState};
use crate::error::{Error, Result};

/// Backing storage for checkpointed workflow states.
///
/// Implementations must make [`WorkflowRepository::record_decision`] an atomic
/// check-and-set: of any number of concurrent calls for one workflow, at most
/// one may observe a pending state and succeed.
#[async_trait]
pub trait WorkflowRepository: Send + Sync + fmt::Debug {
    /// Persist a new workflow; fails if the identifier is taken
    async fn insert(&self, id: WorkflowId, state: WorkflowState) -> Result<()>;

    /// Latest checkpoint of a workflow
    async fn get(&self, id: &WorkflowId) -> Result<Option<WorkflowState>>;

    /// Atomically record a decision on a pending workflow and return the updated checkpoint
    async fn record_decision(&self, id: &WorkflowId, decision: Decision) -> Result<WorkflowState>;

    /// Overwrite the checkpoint of an existing workflow
    async fn save(&self, id: &WorkflowId, state: WorkflowState) -> Result<()>;

    /// All workflows still waiting for a decision
    async fn list_pending(&self) -> Result<BTreeMap<WorkflowId, WorkflowState>>;

    /// Number of stored workflows
    async fn len(&self) -> Result<usize>;
}

/// Process-local repository; contents are lost on restart
#[derive(Debug, Default)]
pub struct InMemoryWorkflowRepository {
    workflows: RwLock<HashMap<WorkflowId, WorkflowState>>,
}

impl InMemoryWorkflowRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkflowRepository for InMemoryWorkflowRepository {
    async fn insert(&self, id: WorkflowId, state: WorkflowState) -> Result<()> {
        let mut workflows = self.workflows.write().await;
        if workflows.contains_key(&id) {
            return Err(Error::Storage(format!("workflow {} already exists", id)));
        }
        workflows.insert(id, state);
        Ok(())
    }

    async fn get(&self, id: &WorkflowId) -> Result<Option<WorkflowState>> {
        Ok(self.workflows.read().await.get(id).cloned())
    }

    async fn record_decision(&self, id: &WorkflowId, decision: Decision) -> Result<WorkflowState> {
        let mut workflows = self.workflows.write().await;
        let state = workflows
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        state
            .apply_decision(decision)
            .map_err(|status| Error::AlreadyDecided {
                id: id.to_string(),
                status,
            })?;

        Ok(state.clone())
    }

    async fn save(&self, id: &WorkflowId, state: WorkflowState) -> Result<()> {
        let mut workflows = self.workflows.write().await;
        match workflows.get_mut(id) {
            Some(slot) => {
                *slot = state;
                Ok(())
            }
            None => Err(Error::NotFound(id.to_string())),
        }
    }

    async fn list_pending(&self) -> Result<BTreeMap<WorkflowId, WorkflowState>> {
        Ok(self
            .workflows
            .read()
            .await
            .iter()
            .filter(|(_, state)| state.is_pending())
            .map(|(id, state)| (*id, state.clone()))
            .collect())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.workflows.read().await.len())
    }
}
