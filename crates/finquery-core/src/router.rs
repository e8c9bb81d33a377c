//! Rule router: code-enforced tool selection over probabilistic choice
//!
//! An ordered table of (predicate, action) rules is evaluated top to bottom
//! over the immutable [`Query`]; the first match wins. Queries no rule
//! claims fall through to a default mapping keyed purely by intent. The
//! router is a pure function: it never consults the LLM and never touches
//! the network, which keeps precedence auditable and testable in isolation.

use crate::config::ControllerConfig;
use crate::intent::IntentClassifier;
use crate::query::{Intent, Query, ToolCall, ToolKind, Ticker};
use std::sync::Arc;
use tracing::debug;

type Predicate = Box<dyn Fn(&Query) -> bool + Send + Sync>;
type Action = Box<dyn Fn(&Query) -> Vec<ToolCall> + Send + Sync>;

/// A single routing rule
struct Rule {
    name: &'static str,
    predicate: Predicate,
    action: Action,
}

/// Deterministic override layer mapping queries to tool call sets
pub struct RuleRouter {
    rules: Vec<Rule>,
    trend_horizon_days: u32,
}

impl RuleRouter {
    /// Build the default rule table from configuration
    pub fn new(config: &ControllerConfig) -> Self {
        let classifier = Arc::new(IntentClassifier::new(&config.routing));
        let horizon = config.trend_horizon_days;

        let mut rules: Vec<Rule> = Vec::new();

        // Rule 1: multi-ticker comparison fans the sub-intent tool out
        // across every extracted ticker; fundamentals when no keyword picks
        // a more specific tool.
        {
            let classifier = Arc::clone(&classifier);
            rules.push(Rule {
                name: "comparison-fanout",
                predicate: Box::new(|q| q.entities.len() >= 2),
                action: Box::new(move |q| {
                    let tool = match classifier.keyword_intent(&q.text) {
                        Some(Intent::Volatility) => ToolKind::Volatility,
                        Some(Intent::Trend) => ToolKind::TrendForecast,
                        Some(Intent::Price) => ToolKind::CurrentPrice,
                        _ => ToolKind::Fundamentals,
                    };
                    fan_out(tool, &q.entities, horizon)
                }),
            });
        }

        // Rule 2: risk wording always routes to the volatility model
        {
            let classifier = Arc::clone(&classifier);
            rules.push(Rule {
                name: "risk-wording",
                predicate: Box::new(move |q| {
                    !q.entities.is_empty()
                        && classifier.keyword_intent(&q.text) == Some(Intent::Volatility)
                }),
                action: Box::new(move |q| fan_out(ToolKind::Volatility, &q.entities, horizon)),
            });
        }

        // Rule 3: trend wording always routes to the forecast model
        {
            let classifier = Arc::clone(&classifier);
            rules.push(Rule {
                name: "trend-wording",
                predicate: Box::new(move |q| {
                    !q.entities.is_empty()
                        && classifier.keyword_intent(&q.text) == Some(Intent::Trend)
                }),
                action: Box::new(move |q| {
                    fan_out(ToolKind::TrendForecast, &q.entities, horizon)
                }),
            });
        }

        // Rule 4: explicit price wording
        {
            let classifier = Arc::clone(&classifier);
            rules.push(Rule {
                name: "price-wording",
                predicate: Box::new(move |q| {
                    !q.entities.is_empty()
                        && classifier.keyword_intent(&q.text) == Some(Intent::Price)
                }),
                action: Box::new(move |q| fan_out(ToolKind::CurrentPrice, &q.entities, horizon)),
            });
        }

        Self {
            rules,
            trend_horizon_days: horizon,
        }
    }

    /// Resolve a query to its tool call set
    ///
    /// First matching rule wins; otherwise the intent's default tool is
    /// dispatched once per extracted entity. `General` intent (or no
    /// entities) yields an empty set, which is a valid state, not an error.
    pub fn route(&self, query: &Query) -> Vec<ToolCall> {
        for rule in &self.rules {
            if (rule.predicate)(query) {
                debug!(rule = rule.name, "routing rule matched");
                return (rule.action)(query);
            }
        }

        self.default_mapping(query)
    }

    /// Fall-through mapping keyed purely by intent
    fn default_mapping(&self, query: &Query) -> Vec<ToolCall> {
        let tool = match query.intent {
            Intent::Price => ToolKind::CurrentPrice,
            Intent::Fundamentals | Intent::Comparison => ToolKind::Fundamentals,
            Intent::Trend => ToolKind::TrendForecast,
            Intent::Volatility => ToolKind::Volatility,
            Intent::General => return Vec::new(),
        };

        fan_out(tool, &query.entities, self.trend_horizon_days)
    }
}

/// One call of `tool` per ticker; trend calls carry the horizon
fn fan_out(tool: ToolKind, entities: &[Ticker], horizon_days: u32) -> Vec<ToolCall> {
    entities
        .iter()
        .map(|ticker| {
            if tool == ToolKind::TrendForecast {
                ToolCall::with_horizon(tool, ticker.clone(), horizon_days)
            } else {
                ToolCall::new(tool, ticker.clone())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityExtractor;

    fn router() -> RuleRouter {
        RuleRouter::new(&ControllerConfig::default())
    }

    fn analyze(text: &str) -> Query {
        let extractor = EntityExtractor::with_defaults();
        let classifier = IntentClassifier::with_defaults();
        let entities = extractor.extract(text);
        let intent = classifier.classify(text, &entities);
        Query {
            text: text.to_string(),
            entities,
            intent,
        }
    }

    #[test]
    fn test_comparison_fans_out_same_tool_per_ticker() {
        let query = analyze("Compare Apple vs Microsoft fundamentals");
        assert_eq!(query.intent, Intent::Comparison);

        let calls = router().route(&query);
        assert_eq!(
            calls,
            vec![
                ToolCall::new(ToolKind::Fundamentals, Ticker::new("AAPL")),
                ToolCall::new(ToolKind::Fundamentals, Ticker::new("MSFT")),
            ]
        );
    }

    #[test]
    fn test_comparison_sub_intent_picks_volatility() {
        let query = analyze("Which is more volatile, AAPL or MSFT?");
        let calls = router().route(&query);

        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|c| c.tool == ToolKind::Volatility));
    }

    #[test]
    fn test_risk_wording_routes_to_volatility() {
        let query = analyze("Is NVIDIA risky right now?");
        let calls = router().route(&query);

        assert_eq!(
            calls,
            vec![ToolCall::new(ToolKind::Volatility, Ticker::new("NVDA"))]
        );
    }

    #[test]
    fn test_trend_rule_carries_horizon() {
        let query = analyze("Forecast the trend for TSLA");
        let calls = router().route(&query);

        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].tool, ToolKind::TrendForecast);
        assert_eq!(calls[0].horizon_days, Some(7));
    }

    #[test]
    fn test_pe_question_routes_to_fundamentals() {
        let query = analyze("What is the PE of AAPL?");
        let calls = router().route(&query);

        assert_eq!(
            calls,
            vec![ToolCall::new(ToolKind::Fundamentals, Ticker::new("AAPL"))]
        );
    }

    #[test]
    fn test_no_entities_yields_empty_call_set() {
        let query = analyze("what is diversification?");
        assert!(router().route(&query).is_empty());
    }

    #[test]
    fn test_default_mapping_single_entity() {
        // No tool keyword at all: falls through to the price default
        let query = analyze("Tell me about AAPL");
        let calls = router().route(&query);

        assert_eq!(
            calls,
            vec![ToolCall::new(ToolKind::CurrentPrice, Ticker::new("AAPL"))]
        );
    }

    #[test]
    fn test_comparison_rule_takes_precedence_over_risk_rule() {
        // Both the comparison and risk predicates match; table order wins
        let query = analyze("Is Apple or Tesla riskier?");
        let calls = router().route(&query);

        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|c| c.tool == ToolKind::Volatility));
    }

    #[test]
    fn test_router_is_pure() {
        let query = analyze("Is NVDA risky?");
        let r = router();
        assert_eq!(r.route(&query), r.route(&query));
    }
}
