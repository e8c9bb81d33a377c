//! Intent classification: query text + entities → one fixed intent
//!
//! Classification is pure and deterministic so the rule router can override
//! tool selection without re-deriving it.

use crate::config::RoutingConfig;
use crate::query::{Intent, Ticker};

/// Keyword-driven intent classifier
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    volatility: Vec<String>,
    trend: Vec<String>,
    fundamentals: Vec<String>,
    price: Vec<String>,
}

impl IntentClassifier {
    /// Create a classifier from routing configuration
    pub fn new(config: &RoutingConfig) -> Self {
        Self {
            volatility: lowercase_all(&config.volatility_keywords),
            trend: lowercase_all(&config.trend_keywords),
            fundamentals: lowercase_all(&config.fundamentals_keywords),
            price: lowercase_all(&config.price_keywords),
        }
    }

    /// Create a classifier with the default keyword sets
    pub fn with_defaults() -> Self {
        Self::new(&RoutingConfig::default())
    }

    /// Classify a query
    ///
    /// Two or more distinct tickers always mean `Comparison`, regardless of
    /// keyword content. Otherwise keyword sets are checked in fixed
    /// precedence order; one entity with no keyword hit defaults to `Price`,
    /// no entity with no keyword hit is `General`.
    pub fn classify(&self, text: &str, entities: &[Ticker]) -> Intent {
        if entities.len() >= 2 {
            return Intent::Comparison;
        }

        let lower = text.to_lowercase();

        if matches_any(&lower, &self.volatility) {
            Intent::Volatility
        } else if matches_any(&lower, &self.trend) {
            Intent::Trend
        } else if matches_any(&lower, &self.fundamentals) {
            Intent::Fundamentals
        } else if matches_any(&lower, &self.price) {
            Intent::Price
        } else if entities.len() == 1 {
            Intent::Price
        } else {
            Intent::General
        }
    }

    /// Sub-intent for comparison fan-out: which tool-selecting keyword set
    /// matched, ignoring the entity count
    pub fn keyword_intent(&self, text: &str) -> Option<Intent> {
        let lower = text.to_lowercase();

        if matches_any(&lower, &self.volatility) {
            Some(Intent::Volatility)
        } else if matches_any(&lower, &self.trend) {
            Some(Intent::Trend)
        } else if matches_any(&lower, &self.fundamentals) {
            Some(Intent::Fundamentals)
        } else if matches_any(&lower, &self.price) {
            Some(Intent::Price)
        } else {
            None
        }
    }
}

fn matches_any(query: &str, keywords: &[String]) -> bool {
    // Two-letter keywords like "pe" match whole words only; substring
    // matching would fire inside "perform" or "happen". Longer keywords
    // stay substring matches so "risk" still covers "riskier".
    keywords.iter().any(|kw| {
        if kw.len() <= 2 {
            contains_word(query, kw)
        } else {
            query.contains(kw.as_str())
        }
    })
}

fn contains_word(query: &str, word: &str) -> bool {
    let bytes = query.as_bytes();
    let mut start = 0;

    while let Some(pos) = query[start..].find(word) {
        let begin = start + pos;
        let end = begin + word.len();

        let boundary_before = begin == 0 || !bytes[begin - 1].is_ascii_alphanumeric();
        let boundary_after = end == bytes.len() || !bytes[end].is_ascii_alphanumeric();
        if boundary_before && boundary_after {
            return true;
        }

        start = end;
    }

    false
}

fn lowercase_all(words: &[String]) -> Vec<String> {
    words.iter().map(|w| w.to_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> IntentClassifier {
        IntentClassifier::with_defaults()
    }

    fn tickers(symbols: &[&str]) -> Vec<Ticker> {
        symbols.iter().map(Ticker::new).collect()
    }

    #[test]
    fn test_volatility_detection() {
        let c = classifier();
        assert_eq!(
            c.classify("Is NVDA risky right now?", &tickers(&["NVDA"])),
            Intent::Volatility
        );
        assert_eq!(
            c.classify("How volatile is TSLA?", &tickers(&["TSLA"])),
            Intent::Volatility
        );
    }

    #[test]
    fn test_trend_detection() {
        let c = classifier();
        assert_eq!(
            c.classify("Forecast AAPL for next week", &tickers(&["AAPL"])),
            Intent::Trend
        );
    }

    #[test]
    fn test_fundamentals_detection() {
        let c = classifier();
        assert_eq!(
            c.classify("What is the market cap of MSFT?", &tickers(&["MSFT"])),
            Intent::Fundamentals
        );
    }

    #[test]
    fn test_bare_pe_routes_to_fundamentals() {
        let c = classifier();
        assert_eq!(
            c.classify("What is the PE of AAPL?", &tickers(&["AAPL"])),
            Intent::Fundamentals
        );
    }

    #[test]
    fn test_short_keywords_need_word_boundaries() {
        let c = classifier();
        // "pe" inside "perform" must not select fundamentals
        assert_eq!(
            c.classify("How will AAPL perform?", &tickers(&["AAPL"])),
            Intent::Price
        );
        assert_eq!(c.keyword_intent("what could happen next month"), None);
    }

    #[test]
    fn test_price_detection() {
        let c = classifier();
        assert_eq!(
            c.classify("What is the price of AAPL?", &tickers(&["AAPL"])),
            Intent::Price
        );
    }

    #[test]
    fn test_two_tickers_always_comparison() {
        let c = classifier();
        // Keyword content does not matter once two tickers are present
        assert_eq!(
            c.classify("AAPL MSFT", &tickers(&["AAPL", "MSFT"])),
            Intent::Comparison
        );
        assert_eq!(
            c.classify(
                "Is AAPL or MSFT more volatile?",
                &tickers(&["AAPL", "MSFT"])
            ),
            Intent::Comparison
        );
    }

    #[test]
    fn test_single_entity_no_keyword_defaults_to_price() {
        let c = classifier();
        assert_eq!(
            c.classify("Tell me about AAPL", &tickers(&["AAPL"])),
            Intent::Price
        );
    }

    #[test]
    fn test_no_entity_no_keyword_is_general() {
        let c = classifier();
        assert_eq!(c.classify("hello there", &[]), Intent::General);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let c = classifier();
        let first = c.classify("Is NVDA risky?", &tickers(&["NVDA"]));
        let second = c.classify("Is NVDA risky?", &tickers(&["NVDA"]));
        assert_eq!(first, second);
    }

    #[test]
    fn test_keyword_intent_for_comparison_fanout() {
        let c = classifier();
        assert_eq!(
            c.keyword_intent("which is more volatile"),
            Some(Intent::Volatility)
        );
        assert_eq!(c.keyword_intent("compare them"), None);
    }
}
