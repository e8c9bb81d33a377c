//! HTTP client for the financial MCP data/ML service
//!
//! Endpoint layout of the upstream service:
//! `GET {base}/price/{symbol}`, `GET {base}/fundamentals/{symbol}`,
//! `GET {base}/ml/trend/{symbol}`, `GET {base}/ml/volatility/{symbol}`.
//!
//! The service runs on free-tier hosting and cold-starts after idle
//! periods, so connect failures and gateway errors are classified as
//! [`ToolError::ColdStart`] to make them retryable.

use crate::error::ToolError;
use crate::tools::MarketDataService;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client for the market data / ML scoring service
#[derive(Debug, Clone)]
pub struct McpDataClient {
    client: Client,
    base_url: String,
}

impl McpDataClient {
    /// Create a client for the given base URL
    pub fn new(base_url: impl Into<String>) -> Result<Self, ToolError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with a custom request timeout
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ToolError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ToolError::Upstream(format!("failed to build client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// The configured base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json(&self, path: &str) -> Result<Value, ToolError> {
        let url = format!("{}/{path}", self.base_url);
        debug!(%url, "fetching from data service");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let reason = format!("HTTP {status}");
            // Gateway errors usually mean the free-tier instance is waking up
            return Err(match status.as_u16() {
                502 | 503 => ToolError::ColdStart(reason),
                _ => ToolError::Upstream(reason),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ToolError::InvalidPayload(e.to_string()))
    }
}

/// Map reqwest transport failures onto the retry taxonomy
fn classify_transport_error(err: reqwest::Error) -> ToolError {
    if err.is_timeout() {
        ToolError::Timeout
    } else if err.is_connect() {
        ToolError::ColdStart(err.to_string())
    } else {
        ToolError::Upstream(err.to_string())
    }
}

#[async_trait]
impl MarketDataService for McpDataClient {
    async fn fetch_price(&self, symbol: &str) -> Result<Value, ToolError> {
        self.get_json(&format!("price/{symbol}")).await
    }

    async fn fetch_fundamentals(&self, symbol: &str) -> Result<Value, ToolError> {
        self.get_json(&format!("fundamentals/{symbol}")).await
    }

    async fn predict_trend(&self, symbol: &str, _horizon_days: u32) -> Result<Value, ToolError> {
        // Horizon is fixed server-side for now; the parameter is part of the
        // contract so callers do not change when the service grows one.
        self.get_json(&format!("ml/trend/{symbol}")).await
    }

    async fn predict_volatility(&self, symbol: &str) -> Result<Value, ToolError> {
        self.get_json(&format!("ml/volatility/{symbol}")).await
    }
}
