//! Ticker symbol normalization and market classification.
//!
//! Raw user input ("petr4", " VALE3.SA ", "AAPL") is turned into a canonical
//! provider-facing symbol plus a market tag. Normalization is pure and
//! deterministic so its output can serve directly as a cache-key component.

use serde::{Deserialize, Serialize};

/// Market classification derived from the symbol suffix.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Market {
    /// Brazilian exchange (".SA" suffix)
    B3,
    /// Bare symbols with no suffix
    Nyse,
    /// Any other suffix
    Unknown,
}

impl std::fmt::Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Market::B3 => "B3",
            Market::Nyse => "NYSE",
            Market::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// A canonical symbol together with its market classification.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSymbol {
    pub symbol: String,
    pub market: Market,
}

impl NormalizedSymbol {
    pub fn as_str(&self) -> &str {
        &self.symbol
    }
}

impl std::fmt::Display for NormalizedSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.symbol)
    }
}

/// Normalizes a raw ticker into its canonical form.
///
/// Rules applied in order:
/// 1. Trim whitespace and uppercase.
/// 2. Unqualified symbols that look like B3 tickers (at least 4 characters,
///    last character a digit, no dot) get a ".SA" suffix appended.
/// 3. Market is classified from the resulting suffix.
///
/// Total and idempotent: any input yields a result, and normalizing an
/// already-normalized symbol returns it unchanged. Rejecting empty symbols
/// is the caller's concern (request validation), not this function's.
pub fn normalize(raw: &str) -> NormalizedSymbol {
    let mut symbol = raw.trim().to_uppercase();
    if looks_like_b3_ticker(&symbol) {
        symbol.push_str(".SA");
    }

    let market = classify_market(&symbol);
    NormalizedSymbol { symbol, market }
}

/// Classifies the market for an already-normalized symbol.
pub fn classify_market(symbol: &str) -> Market {
    if symbol.ends_with(".SA") {
        Market::B3
    } else if !symbol.contains('.') {
        Market::Nyse
    } else {
        Market::Unknown
    }
}

/// Heuristic for unqualified B3 tickers (e.g. "PETR4", "B3SA3").
fn looks_like_b3_ticker(symbol: &str) -> bool {
    !symbol.contains('.')
        && symbol.len() >= 4
        && symbol.chars().last().is_some_and(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_b3_ticker_gets_sa_suffix() {
        let normalized = normalize("petr4");
        assert_eq!(normalized.symbol, "PETR4.SA");
        assert_eq!(normalized.market, Market::B3);
    }

    #[test]
    fn test_already_qualified_symbol_unchanged() {
        let normalized = normalize(" VALE3.SA ");
        assert_eq!(normalized.symbol, "VALE3.SA");
        assert_eq!(normalized.market, Market::B3);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let first = normalize("itub4");
        let second = normalize(&first.symbol);
        assert_eq!(first, second);
    }

    #[test]
    fn test_bare_symbol_classified_nyse() {
        let normalized = normalize("AAPL");
        assert_eq!(normalized.symbol, "AAPL");
        assert_eq!(normalized.market, Market::Nyse);
    }

    #[test]
    fn test_short_symbol_not_suffixed() {
        // Three characters, digit at the end, still too short for the rule.
        let normalized = normalize("BK4");
        assert_eq!(normalized.symbol, "BK4");
        assert_eq!(normalized.market, Market::Nyse);
    }

    #[test]
    fn test_letter_ending_symbol_not_suffixed() {
        let normalized = normalize("MSFT");
        assert_eq!(normalized.symbol, "MSFT");
        assert_eq!(normalized.market, Market::Nyse);
    }

    #[test]
    fn test_foreign_suffix_classified_unknown() {
        let normalized = normalize("BMW.DE");
        assert_eq!(normalized.symbol, "BMW.DE");
        assert_eq!(normalized.market, Market::Unknown);
    }

    #[test]
    fn test_normalize_is_total_on_empty_input() {
        let normalized = normalize("   ");
        assert_eq!(normalized.symbol, "");
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Market::B3.to_string(), "B3");
        assert_eq!(Market::Nyse.to_string(), "NYSE");
        assert_eq!(Market::Unknown.to_string(), "UNKNOWN");
    }
}
