//! Request-scoped query and tool call types

use crate::error::ToolError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized, uppercase ticker symbol
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Ticker(String);

impl Ticker {
    /// Create a ticker, normalizing to uppercase
    pub fn new(symbol: impl AsRef<str>) -> Self {
        Self(symbol.as_ref().trim().to_uppercase())
    }

    /// The symbol as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Ticker {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Intent detected from a user query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    /// Current price or quote lookup
    Price,
    /// Fundamental metrics (P/E, market cap, revenue, ...)
    Fundamentals,
    /// Price trend forecast
    Trend,
    /// Volatility / risk assessment
    Volatility,
    /// Multi-ticker comparison
    Comparison,
    /// General question, no tool required
    General,
}

/// The fixed set of dispatchable tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    /// Latest market price
    CurrentPrice,
    /// Fundamental metrics
    Fundamentals,
    /// ML price trend forecast
    TrendForecast,
    /// ML volatility / risk score
    Volatility,
}

impl ToolKind {
    /// Stable wire name, matching the upstream service registry
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::CurrentPrice => "get_current_price",
            Self::Fundamentals => "get_fundamentals",
            Self::TrendForecast => "predict_price_trend",
            Self::Volatility => "predict_volatility",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// A single tool invocation request
///
/// `Ord` so call sets and result maps stay deterministic; at most one call
/// per (tool, ticker) pair survives dedup within a request.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ToolCall {
    /// Which tool to invoke
    pub tool: ToolKind,
    /// Ticker argument
    pub ticker: Ticker,
    /// Forecast horizon in days (trend calls only)
    pub horizon_days: Option<u32>,
}

impl ToolCall {
    /// Create a call with no extra parameters
    pub fn new(tool: ToolKind, ticker: Ticker) -> Self {
        Self {
            tool,
            ticker,
            horizon_days: None,
        }
    }

    /// Create a trend call with an explicit horizon
    pub fn with_horizon(tool: ToolKind, ticker: Ticker, horizon_days: u32) -> Self {
        Self {
            tool,
            ticker,
            horizon_days: Some(horizon_days),
        }
    }
}

/// Outcome of a dispatched tool call
///
/// Every dispatched call yields exactly one result; failures are values,
/// never exceptions that abort sibling calls.
#[derive(Debug, Clone)]
pub enum ToolResult {
    /// Upstream answered with a decodable payload
    Success {
        /// Opaque payload from the collaborator
        data: serde_json::Value,
    },
    /// The call failed after the retry budget was exhausted
    Failure {
        /// Why the call failed
        error: ToolError,
    },
}

impl ToolResult {
    /// Whether this result carries data
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// A user query with its derived entities and intent
#[derive(Debug, Clone)]
pub struct Query {
    /// Raw user text
    pub text: String,
    /// Extracted tickers, sorted and deduplicated
    pub entities: Vec<Ticker>,
    /// Classified intent
    pub intent: Intent,
}
