//! LLM integrations used by the content generator.
//!
//! This module provides the client abstraction and, behind the `anthropic`
//! feature, a client for the Anthropic Messages API.

#[cfg(feature = "anthropic")]
pub mod anthropic;
/// Common types for LLM integrations
pub mod types;

// Re-export key components
#[cfg(feature = "anthropic")]
pub use anthropic::AnthropicClient;
pub use types::{Completion, CompletionRequest, LlmClient, LlmConfig, Message, MessageRole};
