//! Error types for the content approval pipeline
//!
//! Every failure surfaced by the store or the coordinator carries a stable
//! [`ErrorKind`] so callers can branch on it without parsing messages.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::generator::GenerationError;
use crate::workflow::state::ApprovalStatus;

/// Content approval error types
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// No workflow is stored under the identifier
    #[error("Workflow not found: {0}")]
    NotFound(String),

    /// A decision was already recorded for the workflow
    #[error("Workflow {id} already decided ({status})")]
    AlreadyDecided {
        /// Identifier of the workflow
        id: String,
        /// Approval status at the time of the rejected decision
        status: ApprovalStatus,
    },

    /// The generator failed; nothing was persisted
    #[error("Content generation failed: {0}")]
    GenerationFailed(#[from] GenerationError),

    /// The request did not pass validation
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// The workflow repository rejected an operation
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for content approval operations
pub type Result<T> = std::result::Result<T, Error>;

/// Stable, machine-readable classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Unknown workflow identifier
    NotFound,
    /// Decision replay on a decided workflow
    AlreadyDecided,
    /// Generator failure during creation
    GenerationFailed,
    /// Request validation failure
    InvalidRequest,
    /// Misconfiguration
    Config,
    /// Repository failure
    Storage,
}

impl ErrorKind {
    /// The snake_case name used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::AlreadyDecided => "already_decided",
            ErrorKind::GenerationFailed => "generation_failed",
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::Config => "config",
            ErrorKind::Storage => "storage",
        }
    }

    /// Whether the caller is at fault (as opposed to the service or a collaborator)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::NotFound | ErrorKind::AlreadyDecided | ErrorKind::InvalidRequest
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::AlreadyDecided { .. } => ErrorKind::AlreadyDecided,
            Error::GenerationFailed(_) => ErrorKind::GenerationFailed,
            Error::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Error::Config(_) => ErrorKind::Config,
            Error::Storage(_) => ErrorKind::Storage,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Config(format!("Failed to parse config file: {}", err))
    }
}
