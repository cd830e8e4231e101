use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::symbol::Market;

/// Outcome of a ticker validation probe.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidationResult {
    /// The symbol after normalization, as sent to the provider.
    pub symbol: String,
    pub is_valid: bool,
    /// Whether the instrument currently has a quotable market price.
    pub tradable: bool,
    pub market: Market,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_trade: Option<NaiveDate>,
    /// Alternative symbols for invalid input, at most three.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl ValidationResult {
    /// Builds a negative result carrying suggestions.
    pub fn invalid(
        symbol: impl Into<String>,
        market: Market,
        suggestions: Vec<String>,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            is_valid: false,
            tradable: false,
            market,
            last_trade: None,
            suggestions,
            error_message: Some(error_message.into()),
            checked_at: Utc::now(),
        }
    }
}
