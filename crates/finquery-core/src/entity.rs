//! Entity extraction: free text → recognized ticker symbols
//!
//! Two recognition paths, both driven by [`RoutingConfig`] data:
//! explicit 1-5 letter uppercase tokens, and a case-insensitive company
//! alias table matched longest-first at word boundaries so "Meta" never
//! fires inside "Metadata".

use crate::config::RoutingConfig;
use crate::query::Ticker;
use std::collections::HashSet;

/// Extracts ticker entities from raw query text
///
/// Extraction never fails: a query with no recognizable entities yields an
/// empty set, which downstream treats as the general-answer path.
#[derive(Debug, Clone)]
pub struct EntityExtractor {
    /// (lowercased alias, ticker) pairs, sorted longest alias first
    aliases: Vec<(String, Ticker)>,
    stopwords: HashSet<String>,
}

impl EntityExtractor {
    /// Create an extractor from routing configuration
    pub fn new(config: &RoutingConfig) -> Self {
        let mut aliases: Vec<(String, Ticker)> = config
            .aliases
            .iter()
            .map(|(name, symbol)| (name.to_lowercase(), Ticker::new(symbol)))
            .collect();

        // Longest-match-first so multi-word aliases win over their prefixes
        aliases.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        Self {
            aliases,
            stopwords: config
                .symbol_stopwords
                .iter()
                .map(|s| s.to_uppercase())
                .collect(),
        }
    }

    /// Create an extractor with the default alias table
    pub fn with_defaults() -> Self {
        Self::new(&RoutingConfig::default())
    }

    /// Extract the set of tickers referenced by `text`
    ///
    /// The result is sorted and deduplicated; a query mentioning the same
    /// company by symbol and by name yields that ticker once.
    pub fn extract(&self, text: &str) -> Vec<Ticker> {
        let mut found: Vec<Ticker> = Vec::new();

        self.extract_aliases(text, &mut found);
        self.extract_symbols(text, &mut found);

        found.sort();
        found.dedup();
        found
    }

    /// Match company-name aliases, longest first, claiming matched spans
    fn extract_aliases(&self, text: &str, found: &mut Vec<Ticker>) {
        let lower = text.to_lowercase();
        let bytes = lower.as_bytes();
        let mut claimed = vec![false; bytes.len()];

        for (alias, ticker) in &self.aliases {
            let mut start = 0;
            while let Some(pos) = lower[start..].find(alias.as_str()) {
                let begin = start + pos;
                let end = begin + alias.len();

                let boundary_before =
                    begin == 0 || !bytes[begin - 1].is_ascii_alphanumeric();
                let boundary_after =
                    end == bytes.len() || !bytes[end].is_ascii_alphanumeric();
                let overlaps = claimed[begin..end].iter().any(|c| *c);

                if boundary_before && boundary_after && !overlaps {
                    for c in &mut claimed[begin..end] {
                        *c = true;
                    }
                    found.push(ticker.clone());
                }

                start = end;
            }
        }
    }

    /// Match explicit 1-5 letter all-uppercase tokens
    ///
    /// Tokens are cut at every non-alphanumeric character, so punctuation
    /// attached mid-word ("AAPL's") still yields the symbol.
    fn extract_symbols(&self, text: &str, found: &mut Vec<Ticker>) {
        for token in text.split(|c: char| !c.is_alphanumeric()) {
            let looks_like_symbol = !token.is_empty()
                && token.len() <= 5
                && token.chars().all(|c| c.is_ascii_uppercase());

            if looks_like_symbol && !self.stopwords.contains(token) {
                found.push(Ticker::new(token));
            }
        }
    }
}
