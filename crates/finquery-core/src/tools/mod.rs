//! External data/ML collaborators consumed by the dispatcher

mod mcp;

pub use mcp::McpDataClient;

use crate::error::ToolError;
use async_trait::async_trait;
use serde_json::Value;

/// Market data and ML scoring collaborator
///
/// Payloads are opaque to the controller; model internals and field schemas
/// belong to the upstream service. Implementations report failures as
/// [`ToolError`] values so the dispatcher can classify them for retry.
#[async_trait]
pub trait MarketDataService: Send + Sync {
    /// Latest market price for a symbol
    async fn fetch_price(&self, symbol: &str) -> Result<Value, ToolError>;

    /// Fundamental metrics for a symbol
    async fn fetch_fundamentals(&self, symbol: &str) -> Result<Value, ToolError>;

    /// ML price trend forecast over the given horizon
    async fn predict_trend(&self, symbol: &str, horizon_days: u32) -> Result<Value, ToolError>;

    /// ML volatility score and risk level
    async fn predict_volatility(&self, symbol: &str) -> Result<Value, ToolError>;
}
