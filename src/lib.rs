#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![deny(rustdoc::missing_crate_level_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::invalid_codeblock_attributes)]
#![deny(rustdoc::invalid_html_tags)]
#![deny(rustdoc::bare_urls)]
#![deny(clippy::missing_panics_doc)]

//! Content approval is a human-in-the-loop publishing pipeline. A topic is turned
//! into a post by a generator, parked until a reviewer approves or rejects it,
//! and published exactly once on approval.
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use content_approval::config::Settings;
//! use content_approval::coordinator::{ApproveRequest, GenerateRequest, RequestCoordinator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let coordinator = RequestCoordinator::from_settings(&Settings::default())?;
//!
//!     // Generate a post; the workflow now waits for a reviewer
//!     let created = coordinator.generate(GenerateRequest::new("electric vehicles")).await?;
//!     println!("{}", created.content);
//!
//!     // Approve it, which publishes the post
//!     let decided = coordinator
//!         .approve(ApproveRequest::new(&created.workflow_id, true))
//!         .await?;
//!     println!("{}", decided.message);
//!
//!     Ok(())
//! }
//! ```

/// Configuration management
pub mod config;

/// Request coordination between external boundaries and the workflow store
pub mod coordinator;

/// Error types for the approval pipeline
pub mod error;

/// Post generation from a topic
pub mod generator;

/// LLM integrations used by the generator
pub mod llm;

/// Delivery of approved posts
pub mod publisher;

/// Human review of pending posts
pub mod review;

/// HTTP boundary
#[cfg(feature = "http-server")]
pub mod server;

/// Logging and metrics
pub mod telemetry;

/// Workflow engine, state and store
pub mod workflow;

// Re-export the main entry points
pub use coordinator::{ApiError, RequestCoordinator};
pub use error::{Error, ErrorKind, Result};
pub use generator::{ContentGenerator, GenerationError, TemplateGenerator};
pub use publisher::{DryRunPublisher, PublishResult, Publisher};
pub use workflow::{
    ApprovalStatus, Stage, WorkflowEngine, WorkflowId, WorkflowState, WorkflowStatus,
    WorkflowStore,
};

/// Re-export telemetry types and functions for easier access
pub use telemetry::{add_metric, init_telemetry, span_duration, TelemetryConfig};

/// Re-export LLM types for easier access
pub use llm::{Completion, CompletionRequest, LlmClient, LlmConfig, Message as LlmMessage, MessageRole};

#[cfg(feature = "anthropic")]
pub use crate::llm::AnthropicClient;
