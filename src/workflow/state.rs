use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::publisher::PublishResult;

/// Opaque, collision-resistant identifier of a workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowId(Uuid);

impl WorkflowId {
    /// Generate a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WorkflowId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for WorkflowId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Human approval status of a workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    /// No decision yet
    Pending,
    /// Reviewer approved the content
    Approved,
    /// Reviewer rejected the content
    Rejected,
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApprovalStatus::Pending => write!(f, "pending"),
            ApprovalStatus::Approved => write!(f, "approved"),
            ApprovalStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// A reviewer's decision on a pending workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Publish the content
    Approve,
    /// Discard the content
    Reject,
}

impl Decision {
    /// The approval status this decision moves a workflow to
    pub fn status(&self) -> ApprovalStatus {
        match self {
            Decision::Approve => ApprovalStatus::Approved,
            Decision::Reject => ApprovalStatus::Rejected,
        }
    }
}

impl From<bool> for Decision {
    fn from(approved: bool) -> Self {
        if approved {
            Decision::Approve
        } else {
            Decision::Reject
        }
    }
}

/// Position of a workflow in the state machine
///
/// ```text
/// Generate -> WaitApproval -+-> Publish -> Done
///                ^    |     |
///                +----+     +-> Rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Initial, transient: content is being generated
    Generate,
    /// Suspend point: waiting for a reviewer
    WaitApproval,
    /// Transient: content is being published
    Publish,
    /// Terminal: a publish attempt ran
    Done,
    /// Terminal: the reviewer rejected the content
    Rejected,
}

/// Externally visible status of a workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    /// Content generated, waiting for a reviewer
    PendingApproval,
    /// Approved, publish attempt in flight
    Publishing,
    /// Published successfully
    Published,
    /// Approved but the publish attempt failed
    Failed,
    /// Rejected by the reviewer
    Rejected,
}

impl WorkflowStatus {
    /// The snake_case name used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStatus::PendingApproval => "pending_approval",
            WorkflowStatus::Publishing => "publishing",
            WorkflowStatus::Published => "published",
            WorkflowStatus::Failed => "failed",
            WorkflowStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full state of one workflow, checkpointed as a whole after every transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    topic: String,
    content: String,
    approval_status: ApprovalStatus,
    stage: Stage,
    #[serde(skip_serializing_if = "Option::is_none")]
    publish_result: Option<PublishResult>,
    history: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    decided_at: Option<DateTime<Utc>>,
}

impl WorkflowState {
    /// Create the initial state for a topic
    pub fn new(topic: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            topic: topic.into(),
            content: String::new(),
            approval_status: ApprovalStatus::Pending,
            stage: Stage::Generate,
            publish_result: None,
            history: Vec::new(),
            created_at: now,
            updated_at: now,
            decided_at: None,
        }
    }

    /// The submitted topic
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// The generated content (empty before generation)
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The approval status
    pub fn approval_status(&self) -> ApprovalStatus {
        self.approval_status
    }

    /// The current state machine position
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Outcome of the publish attempt, if one ran
    pub fn publish_result(&self) -> Option<&PublishResult> {
        self.publish_result.as_ref()
    }

    /// Transition annotations in insertion order
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Creation time
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Time of the last checkpointed change
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Time the reviewer's decision was recorded
    pub fn decided_at(&self) -> Option<DateTime<Utc>> {
        self.decided_at
    }

    /// Whether the workflow still waits for a reviewer
    pub fn is_pending(&self) -> bool {
        self.approval_status == ApprovalStatus::Pending
    }

    /// Status as reported to callers
    pub fn status(&self) -> WorkflowStatus {
        match (self.approval_status, self.stage, &self.publish_result) {
            (ApprovalStatus::Rejected, _, _) => WorkflowStatus::Rejected,
            (ApprovalStatus::Approved, _, Some(result)) if result.success => {
                WorkflowStatus::Published
            }
            (ApprovalStatus::Approved, _, Some(_)) => WorkflowStatus::Failed,
            (ApprovalStatus::Approved, _, None) => WorkflowStatus::Publishing,
            (ApprovalStatus::Pending, _, _) => WorkflowStatus::PendingApproval,
        }
    }

    /// Routing guard evaluated at [`Stage::WaitApproval`]; a pure read of the approval status
    pub fn approval_route(&self) -> Stage {
        match self.approval_status {
            ApprovalStatus::Pending => Stage::WaitApproval,
            ApprovalStatus::Approved => Stage::Publish,
            ApprovalStatus::Rejected => Stage::Rejected,
        }
    }

    /// Record a reviewer decision.
    ///
    /// Only a generated workflow that is still pending accepts a decision; otherwise
    /// the current approval status is returned and the state is left untouched.
    pub fn apply_decision(&mut self, decision: Decision) -> Result<(), ApprovalStatus> {
        if self.approval_status != ApprovalStatus::Pending || self.stage != Stage::WaitApproval {
            return Err(self.approval_status);
        }

        let now = Utc::now();
        self.approval_status = decision.status();
        self.decided_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    pub(crate) fn set_content(&mut self, content: String) {
        debug_assert!(self.content.is_empty(), "content is generated once");
        self.content = content;
        self.approval_status = ApprovalStatus::Pending;
        self.updated_at = Utc::now();
    }

    pub(crate) fn set_publish_result(&mut self, result: PublishResult) {
        debug_assert!(self.publish_result.is_none(), "publish runs at most once");
        self.publish_result = Some(result);
        self.updated_at = Utc::now();
    }

    /// Append `note` to the history without changing stage
    pub(crate) fn note(&mut self, note: impl Into<String>) {
        self.history.push(note.into());
        self.updated_at = Utc::now();
    }

    /// Move to `stage`, appending `note` to the history
    pub(crate) fn enter(&mut self, stage: Stage, note: impl Into<String>) {
        self.stage = stage;
        self.note(note);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generated(topic: &str) -> WorkflowState {
        let mut state = WorkflowState::new(topic);
        state.set_content(format!("post about {}", topic));
        state.enter(Stage::WaitApproval, "waiting for approval");
        state
    }

    #[test]
    fn test_new_state() {
        let state = WorkflowState::new("rust");
        assert_eq!(state.topic(), "rust");
        assert!(state.content().is_empty());
        assert_eq!(state.stage(), Stage::Generate);
        assert_eq!(state.approval_status(), ApprovalStatus::Pending);
        assert!(state.publish_result().is_none());
        assert!(state.history().is_empty());
    }

    #[test]
    fn test_note_keeps_stage() {
        let mut state = generated("rust");
        state.note("reviewer pinged");
        assert_eq!(state.stage(), Stage::WaitApproval);
        assert_eq!(
            state.history(),
            &["waiting for approval".to_string(), "reviewer pinged".to_string()]
        );
    }

    #[test]
    fn test_decision_applies_once() {
        let mut state = generated("rust");
        assert!(state.apply_decision(Decision::Reject).is_ok());
        assert_eq!(state.approval_status(), ApprovalStatus::Rejected);
        assert!(state.decided_at().is_some());

        let before = state.clone();
        assert_eq!(
            state.apply_decision(Decision::Approve),
            Err(ApprovalStatus::Rejected)
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_decision_requires_generated_content() {
        let mut state = WorkflowState::new("rust");
        assert_eq!(
            state.apply_decision(Decision::Approve),
            Err(ApprovalStatus::Pending)
        );
        assert_eq!(state.approval_status(), ApprovalStatus::Pending);
    }

    #[test]
    fn test_approval_route() {
        let mut state = generated("rust");
        assert_eq!(state.approval_route(), Stage::WaitApproval);
        state.apply_decision(Decision::Approve).unwrap();
        assert_eq!(state.approval_route(), Stage::Publish);

        let mut state = generated("rust");
        state.apply_decision(Decision::Reject).unwrap();
        assert_eq!(state.approval_route(), Stage::Rejected);
    }

    #[test]
    fn test_status_mapping() {
        let mut state = generated("rust");
        assert_eq!(state.status(), WorkflowStatus::PendingApproval);

        state.apply_decision(Decision::Approve).unwrap();
        assert_eq!(state.status(), WorkflowStatus::Publishing);

        state.set_publish_result(PublishResult::failure("twitter", "rate limited"));
        assert_eq!(state.status(), WorkflowStatus::Failed);
        assert_eq!(state.status().as_str(), "failed");
    }

    #[test]
    fn test_workflow_id_roundtrip() {
        let id = WorkflowId::new();
        let parsed: WorkflowId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-workflow".parse::<WorkflowId>().is_err());
        assert_ne!(WorkflowId::new(), WorkflowId::new());
    }

    #[test]
    fn test_state_serializes_snake_case() {
        let state = generated("rust");
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["approval_status"], "pending");
        assert_eq!(value["stage"], "wait_approval");
        assert!(value.get("publish_result").is_none());
    }
}
