//! Workflow engine and store for the approval pipeline.
//!
//! A workflow moves through `Generate -> WaitApproval -> (Publish -> Done | Rejected)`.
//! This module provides:
//!
//! - The workflow state record and its identifier
//! - The engine that advances a state through the transition table
//! - The repository trait and its in-memory backing
//! - The store combining both behind create/get/decide/list operations

/// Workflow execution engine
pub mod engine;
/// Checkpoint storage for workflows
pub mod repository;
/// State management for workflows
pub mod state;
/// Workflow creation, lookup and decisions
pub mod store;

// Re-export key components
pub use engine::{WorkflowEngine, WorkflowEngineConfig};
pub use repository::{InMemoryWorkflowRepository, WorkflowRepository};
pub use state::{ApprovalStatus, Decision, Stage, WorkflowId, WorkflowState, WorkflowStatus};
pub use store::WorkflowStore;
