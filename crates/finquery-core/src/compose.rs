//! Response composition: memory + tool results + query → one completion
//!
//! The composer owns the only LLM call in the pipeline. It serializes tool
//! results into a compact structured block after the memory window and
//! before the current question, so failures surface to the narrative as
//! explicit "data unavailable" markers instead of silently missing numbers.

use crate::config::ControllerConfig;
use crate::error::{ControllerError, Result};
use crate::memory::Turn;
use crate::prompts::{ANALYSIS_SYSTEM_PROMPT, CHAT_SYSTEM_PROMPT};
use crate::query::{Query, ToolCall, ToolResult};
use finquery_llm::{CompletionRequest, LlmProvider, Message};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Builds the final prompt and invokes the completion collaborator
pub struct ResponseComposer {
    provider: Arc<dyn LlmProvider>,
    config: Arc<ControllerConfig>,
}

impl ResponseComposer {
    /// Create a composer over the given provider
    pub fn new(provider: Arc<dyn LlmProvider>, config: Arc<ControllerConfig>) -> Self {
        Self { provider, config }
    }

    /// Compose the final answer for a query
    ///
    /// No retry here: a completion failure is fatal for the request and
    /// propagates as [`ControllerError::LlmUnavailable`].
    pub async fn compose(
        &self,
        query: &Query,
        results: &BTreeMap<ToolCall, ToolResult>,
        context: &[Turn],
    ) -> Result<String> {
        let mut messages: Vec<Message> = context
            .iter()
            .map(|turn| Message {
                role: turn.role,
                content: turn.content.clone(),
            })
            .collect();

        let (system, user_message) = if results.is_empty() {
            (CHAT_SYSTEM_PROMPT, query.text.clone())
        } else {
            (
                ANALYSIS_SYSTEM_PROMPT,
                format_analysis_message(&query.text, results),
            )
        };

        messages.push(Message::user(user_message));

        debug!(
            turns = context.len(),
            tool_results = results.len(),
            "composing completion request"
        );

        let request = CompletionRequest::builder(&self.config.model)
            .system(system)
            .messages(messages)
            .max_tokens(self.config.max_tokens)
            .build();

        let response = self
            .provider
            .complete(request)
            .await
            .map_err(ControllerError::from)?;

        Ok(response.message.content)
    }
}

/// Serialize tool results into the structured data block
///
/// Every dispatched call appears: successes as pretty JSON under a
/// `tool ticker` heading, failures as explicit unavailability markers so
/// the model acknowledges the gap instead of fabricating numbers.
fn format_analysis_message(question: &str, results: &BTreeMap<ToolCall, ToolResult>) -> String {
    let mut block = String::new();

    for (call, result) in results {
        match result {
            ToolResult::Success { data } => {
                let body = serde_json::to_string_pretty(data)
                    .unwrap_or_else(|_| data.to_string());
                block.push_str(&format!("### {} {}\n{}\n\n", call.tool, call.ticker, body));
            }
            ToolResult::Failure { error } => {
                block.push_str(&format!(
                    "### {} {}\ndata unavailable for {} ({})\n\n",
                    call.tool, call.ticker, call.ticker, error
                ));
            }
        }
    }

    format!(
        "User question:\n{question}\n\nTool results:\n{block}Explain clearly and concisely."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;
    use crate::query::{Intent, Ticker, ToolKind};
    use async_trait::async_trait;
    use finquery_llm::{
        CompletionResponse, LlmError, StopReason, TokenUsage,
    };
    use serde_json::json;
    use std::sync::Mutex;

    /// Provider stub that records the request it received
    struct RecordingProvider {
        seen: Mutex<Option<CompletionRequest>>,
        fail: bool,
    }

    impl RecordingProvider {
        fn new(fail: bool) -> Self {
            Self {
                seen: Mutex::new(None),
                fail,
            }
        }
    }

    #[async_trait]
    impl LlmProvider for RecordingProvider {
        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> finquery_llm::Result<CompletionResponse> {
            *self.seen.lock().unwrap() = Some(request);
            if self.fail {
                return Err(LlmError::RequestFailed("HTTP 503".to_string()));
            }
            Ok(CompletionResponse {
                message: Message::assistant("the answer"),
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage {
                    input_tokens: 10,
                    output_tokens: 5,
                },
            })
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    fn query(text: &str, entities: &[&str], intent: Intent) -> Query {
        Query {
            text: text.to_string(),
            entities: entities.iter().map(Ticker::new).collect(),
            intent,
        }
    }

    fn composer(provider: Arc<RecordingProvider>) -> ResponseComposer {
        ResponseComposer::new(provider, Arc::new(ControllerConfig::default()))
    }

    #[tokio::test]
    async fn test_chat_mode_without_tool_results() {
        let provider = Arc::new(RecordingProvider::new(false));
        let composer = composer(Arc::clone(&provider));
        let q = query("what is an index fund?", &[], Intent::General);

        let answer = composer.compose(&q, &BTreeMap::new(), &[]).await.unwrap();
        assert_eq!(answer, "the answer");

        let seen = provider.seen.lock().unwrap();
        let request = seen.as_ref().unwrap();
        assert_eq!(request.system.as_deref(), Some(CHAT_SYSTEM_PROMPT));
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].content, "what is an index fund?");
    }

    #[tokio::test]
    async fn test_analysis_mode_includes_all_tickers() {
        let provider = Arc::new(RecordingProvider::new(false));
        let composer = composer(Arc::clone(&provider));
        let q = query(
            "Compare Apple vs Microsoft fundamentals",
            &["AAPL", "MSFT"],
            Intent::Comparison,
        );

        let mut results = BTreeMap::new();
        results.insert(
            ToolCall::new(ToolKind::Fundamentals, Ticker::new("AAPL")),
            ToolResult::Success {
                data: json!({"market_cap": 3_000_000_000_000_u64}),
            },
        );
        results.insert(
            ToolCall::new(ToolKind::Fundamentals, Ticker::new("MSFT")),
            ToolResult::Success {
                data: json!({"market_cap": 2_800_000_000_000_u64}),
            },
        );

        composer.compose(&q, &results, &[]).await.unwrap();

        let seen = provider.seen.lock().unwrap();
        let request = seen.as_ref().unwrap();
        assert_eq!(request.system.as_deref(), Some(ANALYSIS_SYSTEM_PROMPT));
        let body = &request.messages[0].content;
        assert!(body.contains("get_fundamentals AAPL"));
        assert!(body.contains("get_fundamentals MSFT"));
    }

    #[tokio::test]
    async fn test_failures_surface_as_unavailability_markers() {
        let provider = Arc::new(RecordingProvider::new(false));
        let composer = composer(Arc::clone(&provider));
        let q = query("MSFT market cap?", &["MSFT"], Intent::Fundamentals);

        let mut results = BTreeMap::new();
        results.insert(
            ToolCall::new(ToolKind::Fundamentals, Ticker::new("MSFT")),
            ToolResult::Failure {
                error: ToolError::Timeout,
            },
        );

        composer.compose(&q, &results, &[]).await.unwrap();

        let seen = provider.seen.lock().unwrap();
        let body = &seen.as_ref().unwrap().messages[0].content;
        assert!(body.contains("data unavailable for MSFT"));
        assert!(body.contains("timed out"));
    }

    #[tokio::test]
    async fn test_memory_turns_precede_current_question() {
        let provider = Arc::new(RecordingProvider::new(false));
        let composer = composer(Arc::clone(&provider));
        let q = query("and its risk?", &["AAPL"], Intent::Volatility);

        let context = vec![
            Turn::user("what is AAPL at?"),
            Turn::assistant("AAPL trades at $230."),
        ];

        composer.compose(&q, &BTreeMap::new(), &context).await.unwrap();

        let seen = provider.seen.lock().unwrap();
        let messages = &seen.as_ref().unwrap().messages;
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].content, "what is AAPL at?");
        assert_eq!(messages[1].content, "AAPL trades at $230.");
        assert_eq!(messages[2].content, "and its risk?");
    }

    #[tokio::test]
    async fn test_llm_failure_propagates_as_unavailable() {
        let provider = Arc::new(RecordingProvider::new(true));
        let composer = composer(provider);
        let q = query("hello", &[], Intent::General);

        let err = composer.compose(&q, &BTreeMap::new(), &[]).await.unwrap_err();
        assert!(matches!(err, ControllerError::LlmUnavailable(_)));
    }
}
