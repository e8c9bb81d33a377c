//! LLM completion collaborator for the finquery controller
//!
//! This crate defines the message and completion types exchanged with a chat
//! completion service, the [`LlmProvider`] trait the controller composes
//! against, and a Groq (OpenAI-compatible) provider implementation.
//!
//! The controller treats the completion service as a single opaque call:
//! system prompt + context turns + structured data block in, answer text out.
//! Retry policy for completions lives with the transport, not here.

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod providers;

pub use completion::{
    CompletionRequest, CompletionRequestBuilder, CompletionResponse, StopReason, TokenUsage,
};
pub use error::{LlmError, Result};
pub use messages::{Message, Role};
pub use provider::LlmProvider;
pub use providers::{GroqConfig, GroqProvider};
