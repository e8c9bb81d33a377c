//! Error types for the query routing controller

use thiserror::Error;

/// Failure of a single tool call, as seen at the dispatcher boundary
///
/// These never propagate past the dispatcher: every failed call is folded
/// into a `ToolResult::Failure` so the composer always receives a complete
/// result mapping.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolError {
    /// The upstream call exceeded its per-call timeout
    #[error("request timed out")]
    Timeout,

    /// Transient upstream latency, typically a sleeping free-tier instance
    #[error("upstream warming up: {0}")]
    ColdStart(String),

    /// Non-2xx response or transport failure from a data/ML collaborator
    #[error("upstream error: {0}")]
    Upstream(String),

    /// The collaborator answered but the payload could not be decoded
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

impl ToolError {
    /// Whether the dispatcher should retry this failure
    ///
    /// Timeouts and cold starts are retried with backoff; hard upstream
    /// errors and undecodable payloads are not.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout | Self::ColdStart(_))
    }
}

/// Controller-level errors
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The completion service failed; no answer can be composed
    #[error("language model unavailable: {0}")]
    LlmUnavailable(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<finquery_llm::LlmError> for ControllerError {
    fn from(err: finquery_llm::LlmError) -> Self {
        Self::LlmUnavailable(err.to_string())
    }
}

/// Result type alias for controller operations
pub type Result<T> = std::result::Result<T, ControllerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ToolError::Timeout.is_transient());
        assert!(ToolError::ColdStart("waking".to_string()).is_transient());
        assert!(!ToolError::Upstream("HTTP 500".to_string()).is_transient());
        assert!(!ToolError::InvalidPayload("not json".to_string()).is_transient());
    }

    #[test]
    fn test_error_display() {
        let err = ToolError::Upstream("HTTP 500".to_string());
        assert_eq!(err.to_string(), "upstream error: HTTP 500");

        let err = ControllerError::LlmUnavailable("HTTP 503".to_string());
        assert_eq!(err.to_string(), "language model unavailable: HTTP 503");
    }
}
