use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::symbol::Market;

/// One entry in a search or trending result list.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Candidate {
    pub symbol: String,
    pub name: String,
    pub market: Market,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_percent: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Candidate {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>, market: Market) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            market,
            sector: None,
            currency: None,
            current_price: None,
            change_percent: None,
            score: None,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let candidate = Candidate::new("PETR4.SA", "Petrobras PN", Market::B3).with_score(1.0);
        assert_eq!(candidate.symbol, "PETR4.SA");
        assert_eq!(candidate.score, Some(1.0));
        assert!(candidate.current_price.is_none());
    }

    #[test]
    fn test_market_serializes_uppercase() {
        let candidate = Candidate::new("AAPL", "Apple Inc.", Market::Nyse);
        let json = serde_json::to_value(&candidate).unwrap();
        assert_eq!(json["market"], "NYSE");
    }
}
