//! Query routing and tool-dispatch controller for a financial Q&A assistant
//!
//! For each incoming user message the controller decides whether to invoke
//! deterministic data/ML tools, which tools with which ticker arguments, how
//! to merge multiple tool outputs for comparisons, and how to fold the
//! result plus conversation history into a single LLM completion request.
//!
//! # Architecture
//!
//! - [`entity::EntityExtractor`] — free text → recognized ticker symbols
//! - [`intent::IntentClassifier`] — text + entities → one fixed intent
//! - [`router::RuleRouter`] — ordered rule table, code-enforced tool
//!   selection that takes precedence over any probabilistic choice
//! - [`dispatch::ToolDispatcher`] — concurrent fan-out with per-call
//!   timeout and bounded retry, partial failure tolerated
//! - [`memory::ConversationMemory`] — bounded per-session transcripts
//! - [`compose::ResponseComposer`] — memory + tool data + question → one
//!   completion call
//! - [`controller::QueryController`] — the `handle_query` facade
//!
//! Data fetching, ML scoring, and LLM completion are external collaborators
//! behind the [`tools::MarketDataService`] and `LlmProvider` traits.

pub mod compose;
pub mod config;
pub mod controller;
pub mod dispatch;
pub mod entity;
pub mod error;
pub mod intent;
pub mod memory;
pub mod prompts;
pub mod query;
pub mod router;
pub mod tools;

// Re-export main types for convenience
pub use config::{ControllerConfig, RoutingConfig};
pub use controller::{QueryController, QueryResponse};
pub use error::{ControllerError, Result, ToolError};
pub use memory::{ConversationMemory, Turn};
pub use query::{Intent, Query, Ticker, ToolCall, ToolKind, ToolResult};
pub use tools::{MarketDataService, McpDataClient};
