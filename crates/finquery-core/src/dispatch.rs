//! Tool dispatcher: concurrent fan-out over resolved tool calls
//!
//! One task per call, joined before composition proceeds. Per-call failures
//! are values in the result map, never errors that abort sibling calls, so
//! k failed calls still leave n-k successes for the composer.

use crate::config::ControllerConfig;
use crate::error::ToolError;
use crate::query::{ToolCall, ToolKind, ToolResult};
use crate::tools::MarketDataService;
use futures::future::join_all;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Dispatches tool calls against the market data collaborator
pub struct ToolDispatcher {
    service: Arc<dyn MarketDataService>,
    config: Arc<ControllerConfig>,
}

impl ToolDispatcher {
    /// Create a dispatcher over the given collaborator
    pub fn new(service: Arc<dyn MarketDataService>, config: Arc<ControllerConfig>) -> Self {
        Self { service, config }
    }

    /// Dispatch all calls concurrently and wait for every one to settle
    ///
    /// Duplicate (tool, ticker) submissions are collapsed before dispatch so
    /// at most one upstream call is in flight per pair within a request.
    /// Every surviving call is guaranteed a result, success or failure.
    #[instrument(skip_all, fields(calls = calls.len()))]
    pub async fn dispatch(&self, calls: Vec<ToolCall>) -> BTreeMap<ToolCall, ToolResult> {
        let submitted = calls.len();
        let unique: BTreeSet<ToolCall> = calls.into_iter().collect();

        if unique.len() < submitted {
            debug!(
                suppressed = submitted - unique.len(),
                "collapsed duplicate tool calls"
            );
        }

        let tasks = unique.into_iter().map(|call| async move {
            let result = self.execute_with_retry(&call).await;
            (call, result)
        });

        join_all(tasks).await.into_iter().collect()
    }

    /// Run one call with bounded retries for transient failures
    ///
    /// The retry budget exists to absorb upstream cold-start latency;
    /// hard upstream errors fail immediately.
    async fn execute_with_retry(&self, call: &ToolCall) -> ToolResult {
        let mut attempt = 0;

        loop {
            match self.execute_once(call).await {
                Ok(data) => return ToolResult::Success { data },
                Err(error) if error.is_transient() && attempt < self.config.max_retries => {
                    let backoff = self.config.retry_backoff(attempt);
                    warn!(
                        tool = %call.tool,
                        ticker = %call.ticker,
                        attempt,
                        ?backoff,
                        %error,
                        "transient tool failure, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(error) => {
                    warn!(tool = %call.tool, ticker = %call.ticker, %error, "tool call failed");
                    return ToolResult::Failure { error };
                }
            }
        }
    }

    /// One attempt, bounded by the per-call timeout
    async fn execute_once(&self, call: &ToolCall) -> Result<Value, ToolError> {
        let symbol = call.ticker.as_str();
        let horizon = call.horizon_days.unwrap_or(self.config.trend_horizon_days);

        let attempt = async {
            match call.tool {
                ToolKind::CurrentPrice => self.service.fetch_price(symbol).await,
                ToolKind::Fundamentals => self.service.fetch_fundamentals(symbol).await,
                ToolKind::TrendForecast => self.service.predict_trend(symbol, horizon).await,
                ToolKind::Volatility => self.service.predict_volatility(symbol).await,
            }
        };

        match tokio::time::timeout(self.config.tool_timeout, attempt).await {
            Ok(result) => result,
            Err(_) => Err(ToolError::Timeout),
        }
    }
}
