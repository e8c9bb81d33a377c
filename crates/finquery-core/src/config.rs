//! Configuration for the query routing controller
//!
//! Keyword sets and the company alias table are data, not logic: extending
//! them must never require touching the extractor or router algorithms.

use crate::error::{ControllerError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Keyword and alias data driving extraction and classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Company name → ticker aliases, matched case-insensitively
    pub aliases: Vec<(String, String)>,

    /// Uppercase tokens that look like tickers but never are
    pub symbol_stopwords: Vec<String>,

    /// Keywords selecting the volatility tool
    pub volatility_keywords: Vec<String>,

    /// Keywords selecting the trend forecast tool
    pub trend_keywords: Vec<String>,

    /// Keywords selecting the fundamentals tool
    pub fundamentals_keywords: Vec<String>,

    /// Keywords selecting the price tool
    pub price_keywords: Vec<String>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        let aliases = [
            ("Apple", "AAPL"),
            ("Microsoft", "MSFT"),
            ("Google", "GOOGL"),
            ("Alphabet", "GOOGL"),
            ("NVIDIA", "NVDA"),
            ("Meta", "META"),
            ("Tesla", "TSLA"),
            ("General Motors", "GM"),
            ("Ford", "F"),
            ("JPMorgan Chase", "JPM"),
            ("JPMorgan", "JPM"),
            ("Bank of America", "BAC"),
            ("Visa", "V"),
            ("Amazon", "AMZN"),
            ("Walmart", "WMT"),
        ];

        let symbol_stopwords = [
            "A", "I", "AI", "CEO", "ETF", "IT", "OK", "PE", "US", "USD", "VS",
        ];

        Self {
            aliases: aliases
                .iter()
                .map(|(name, symbol)| ((*name).to_string(), (*symbol).to_string()))
                .collect(),
            symbol_stopwords: symbol_stopwords.iter().map(|s| (*s).to_string()).collect(),
            volatility_keywords: to_strings(&["volatility", "volatile", "risky", "risk"]),
            trend_keywords: to_strings(&[
                "trend",
                "forecast",
                "predict",
                "direction",
                "next week",
                "momentum",
            ]),
            fundamentals_keywords: to_strings(&[
                "fundamental",
                "pe",
                "p/e",
                "pe ratio",
                "market cap",
                "revenue",
                "margin",
                "valuation",
                "debt",
                "cash flow",
                "earnings",
            ]),
            price_keywords: to_strings(&[
                "price",
                "quote",
                "worth",
                "cost",
                "how much",
                "trading at",
            ]),
        }
    }
}

fn to_strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|s| (*s).to_string()).collect()
}

/// Configuration for the query routing controller
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Keyword and alias tables
    pub routing: RoutingConfig,

    /// Number of memory turns kept per session (sliding window)
    pub memory_window: usize,

    /// Per-tool-call timeout
    pub tool_timeout: Duration,

    /// Maximum retries per tool call after the initial attempt
    pub max_retries: u32,

    /// Initial backoff duration for tool retries
    pub retry_backoff_base: Duration,

    /// Default forecast horizon for trend calls, in days
    pub trend_horizon_days: u32,

    /// Model identifier passed to the completion service
    pub model: String,

    /// Maximum tokens per completion
    pub max_tokens: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            routing: RoutingConfig::default(),
            memory_window: 10,
            tool_timeout: Duration::from_secs(30),
            max_retries: 2,
            retry_backoff_base: Duration::from_secs(1),
            trend_horizon_days: 7,
            model: finquery_llm::providers::DEFAULT_MODEL.to_string(),
            max_tokens: 1024,
        }
    }
}

impl ControllerConfig {
    /// Create a new configuration builder
    pub fn builder() -> ControllerConfigBuilder {
        ControllerConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.memory_window == 0 {
            return Err(ControllerError::Config(
                "memory_window must be greater than 0".to_string(),
            ));
        }

        if self.tool_timeout.is_zero() {
            return Err(ControllerError::Config(
                "tool_timeout must be non-zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Get retry backoff duration for attempt number
    pub fn retry_backoff(&self, attempt: u32) -> Duration {
        self.retry_backoff_base * 2_u32.pow(attempt)
    }
}

/// Builder for ControllerConfig
#[derive(Debug, Default)]
pub struct ControllerConfigBuilder {
    routing: Option<RoutingConfig>,
    memory_window: Option<usize>,
    tool_timeout: Option<Duration>,
    max_retries: Option<u32>,
    retry_backoff_base: Option<Duration>,
    trend_horizon_days: Option<u32>,
    model: Option<String>,
    max_tokens: Option<usize>,
}

impl ControllerConfigBuilder {
    /// Set the routing tables
    pub fn routing(mut self, routing: RoutingConfig) -> Self {
        self.routing = Some(routing);
        self
    }

    /// Set the memory window size
    pub fn memory_window(mut self, window: usize) -> Self {
        self.memory_window = Some(window);
        self
    }

    /// Set the per-tool-call timeout
    pub fn tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = Some(timeout);
        self
    }

    /// Set maximum retries per tool call
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Set retry backoff base duration
    pub fn retry_backoff_base(mut self, duration: Duration) -> Self {
        self.retry_backoff_base = Some(duration);
        self
    }

    /// Set the default trend forecast horizon in days
    pub fn trend_horizon_days(mut self, days: u32) -> Self {
        self.trend_horizon_days = Some(days);
        self
    }

    /// Set the completion model identifier
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the maximum completion tokens
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ControllerConfig> {
        let defaults = ControllerConfig::default();

        let config = ControllerConfig {
            routing: self.routing.unwrap_or(defaults.routing),
            memory_window: self.memory_window.unwrap_or(defaults.memory_window),
            tool_timeout: self.tool_timeout.unwrap_or(defaults.tool_timeout),
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            retry_backoff_base: self
                .retry_backoff_base
                .unwrap_or(defaults.retry_backoff_base),
            trend_horizon_days: self.trend_horizon_days.unwrap_or(defaults.trend_horizon_days),
            model: self.model.unwrap_or(defaults.model),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
        };

        config.validate()?;
        Ok(config)
    }
}
