use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::FundamentalData;

/// Point-in-time price snapshot for one instrument.
///
/// `change` and `change_percent` are always derived from `price` and
/// `previous_close`; provider-supplied change fields are ignored. When either
/// input is missing the derived fields stay `None` rather than defaulting to
/// zero.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_close: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_percent: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_state: Option<String>,
    pub as_of: DateTime<Utc>,
}

impl QuoteSnapshot {
    /// Recomputes the derived change fields from the current price pair.
    pub fn with_derived_change(mut self) -> Self {
        match (self.price, self.previous_close) {
            (Some(price), Some(prev)) => {
                self.change = Some(price - prev);
                self.change_percent = if prev.is_zero() {
                    None
                } else {
                    Some((price - prev) / prev * Decimal::ONE_HUNDRED)
                };
            }
            _ => {
                self.change = None;
                self.change_percent = None;
            }
        }
        self
    }
}

/// One bar of a historical price series.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoricalPoint {
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<Decimal>,
    pub close: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adj_close: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<Decimal>,
}

/// The full per-instrument payload: snapshot plus whatever extras the request
/// asked for. This is the unit stored in the quote cache.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InstrumentData {
    pub snapshot: QuoteSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fundamentals: Option<FundamentalData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<HistoricalPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn snapshot(price: Option<Decimal>, prev: Option<Decimal>) -> QuoteSnapshot {
        QuoteSnapshot {
            symbol: "PETR4.SA".to_string(),
            name: None,
            price,
            previous_close: prev,
            change: None,
            change_percent: None,
            volume: None,
            currency: None,
            market_state: None,
            as_of: Utc::now(),
        }
    }

    #[test]
    fn test_change_derived_from_price_pair() {
        let quote = snapshot(Some(dec!(38.50)), Some(dec!(35.00))).with_derived_change();
        assert_eq!(quote.change, Some(dec!(3.50)));
        assert_eq!(quote.change_percent, Some(dec!(10)));
    }

    #[test]
    fn test_change_none_when_previous_close_missing() {
        let quote = snapshot(Some(dec!(38.50)), None).with_derived_change();
        assert_eq!(quote.change, None);
        assert_eq!(quote.change_percent, None);
    }

    #[test]
    fn test_change_percent_none_on_zero_previous_close() {
        let quote = snapshot(Some(dec!(5)), Some(dec!(0))).with_derived_change();
        assert_eq!(quote.change, Some(dec!(5)));
        assert_eq!(quote.change_percent, None);
    }

    #[test]
    fn test_missing_optionals_omitted_from_json() {
        let quote = snapshot(None, None);
        let json = serde_json::to_value(&quote).unwrap();
        assert!(json.get("price").is_none());
        assert!(json.get("change_percent").is_none());
        assert_eq!(json["symbol"], "PETR4.SA");
    }
}
