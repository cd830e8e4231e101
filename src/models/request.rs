use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::MarketDataError;

/// Named history ranges understood by the provider.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "5d")]
    FiveDays,
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "max")]
    Max,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneDay => "1d",
            Period::FiveDays => "5d",
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
            Period::Max => "max",
        }
    }

    /// Approximate length of the range in days, used when converting a named
    /// period into an explicit start date. `Max` maps to 30 years.
    pub fn approximate_days(&self) -> i64 {
        match self {
            Period::OneDay => 1,
            Period::FiveDays => 5,
            Period::OneMonth => 30,
            Period::ThreeMonths => 90,
            Period::SixMonths => 180,
            Period::OneYear => 365,
            Period::TwoYears => 730,
            Period::FiveYears => 1825,
            Period::Max => 10950,
        }
    }
}

impl Default for Period {
    fn default() -> Self {
        Period::OneMonth
    }
}

/// Sampling interval for historical series.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1d")]
    Daily,
    #[serde(rename = "1wk")]
    Weekly,
    #[serde(rename = "1mo")]
    Monthly,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Daily => "1d",
            Interval::Weekly => "1wk",
            Interval::Monthly => "1mo",
        }
    }
}

impl Default for Interval {
    fn default() -> Self {
        Interval::Daily
    }
}

/// The date range a request resolves to, after precedence rules.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RequestedRange {
    /// Explicit start/end dates (end may be open).
    Explicit {
        start: NaiveDate,
        end: Option<NaiveDate>,
    },
    /// A named provider range.
    Named(Period),
}

/// A single-instrument fetch request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InstrumentRequest {
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
    #[serde(default)]
    pub interval: Interval,
    #[serde(default)]
    pub include_fundamentals: bool,
    #[serde(default)]
    pub include_history: bool,
}

impl InstrumentRequest {
    /// Builds a minimal snapshot-only request.
    pub fn snapshot(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            period: None,
            start: None,
            end: None,
            interval: Interval::default(),
            include_fundamentals: false,
            include_history: false,
        }
    }

    /// Checks request-level invariants.
    pub fn validate(&self) -> Result<(), MarketDataError> {
        if self.symbol.trim().is_empty() {
            return Err(MarketDataError::Validation(
                "symbol must not be empty".to_string(),
            ));
        }
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if end < start {
                return Err(MarketDataError::Validation(format!(
                    "end date {} precedes start date {}",
                    end, start
                )));
            }
        }
        Ok(())
    }

    /// Resolves the effective history range. Explicit dates take precedence
    /// over a named period; with neither present the default period applies.
    pub fn effective_range(&self) -> RequestedRange {
        match self.start {
            Some(start) => RequestedRange::Explicit {
                start,
                end: self.end,
            },
            None => RequestedRange::Named(self.period.unwrap_or_default()),
        }
    }

    /// Stable textual form of the range, used as a cache-key component.
    pub fn range_key(&self) -> String {
        match self.effective_range() {
            RequestedRange::Explicit { start, end } => match end {
                Some(end) => format!("{}_{}", start, end),
                None => format!("{}_open", start),
            },
            RequestedRange::Named(period) => period.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let request = InstrumentRequest::snapshot("PETR4");
        assert_eq!(request.interval, Interval::Daily);
        assert_eq!(
            request.effective_range(),
            RequestedRange::Named(Period::OneMonth)
        );
    }

    #[test]
    fn test_explicit_dates_take_precedence_over_period() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let request = InstrumentRequest {
            period: Some(Period::FiveYears),
            start: Some(start),
            end: Some(end),
            ..InstrumentRequest::snapshot("VALE3.SA")
        };
        assert_eq!(
            request.effective_range(),
            RequestedRange::Explicit {
                start,
                end: Some(end)
            }
        );
        assert_eq!(request.range_key(), "2024-01-01_2024-03-01");
    }

    #[test]
    fn test_inverted_range_rejected() {
        let request = InstrumentRequest {
            start: NaiveDate::from_ymd_opt(2024, 3, 1),
            end: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..InstrumentRequest::snapshot("VALE3.SA")
        };
        assert!(matches!(
            request.validate(),
            Err(MarketDataError::Validation(_))
        ));
    }

    #[test]
    fn test_empty_symbol_rejected() {
        let request = InstrumentRequest::snapshot("  ");
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_period_serde_names() {
        assert_eq!(serde_json::to_string(&Period::OneMonth).unwrap(), "\"1mo\"");
        assert_eq!(
            serde_json::from_str::<Interval>("\"1wk\"").unwrap(),
            Interval::Weekly
        );
    }
}
