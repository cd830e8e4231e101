//! Yahoo Finance quoteSummary response models.
//!
//! The quoteSummary endpoint wraps most numeric fields in
//! `{"raw": 12.3, "fmt": "12.30"}` objects, or an empty object when the
//! figure is unavailable; only the raw value is used here.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummaryResponse {
    pub quote_summary: QuoteSummaryEnvelope,
}

#[derive(Debug, Deserialize)]
pub struct QuoteSummaryEnvelope {
    #[serde(default)]
    pub result: Vec<QuoteSummaryResult>,
    // The error field exists upstream; failures are detected via HTTP status
    // and empty results instead.
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummaryResult {
    pub price: Option<PriceModule>,
    pub summary_detail: Option<SummaryDetailModule>,
    pub default_key_statistics: Option<KeyStatisticsModule>,
    pub summary_profile: Option<SummaryProfileModule>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceModule {
    pub currency: Option<String>,
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub market_state: Option<String>,
    pub regular_market_price: Option<RawValue>,
    pub regular_market_previous_close: Option<RawValue>,
    pub regular_market_volume: Option<RawValue>,
    pub regular_market_time: Option<i64>,
}

/// Numeric field wrapper with raw and formatted variants.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RawValue {
    pub raw: Option<f64>,
    // fmt exists upstream but is never used.
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDetailModule {
    pub market_cap: Option<RawValue>,
    #[serde(rename = "trailingPE")]
    pub trailing_pe: Option<RawValue>,
    pub dividend_yield: Option<RawValue>,
    pub fifty_two_week_high: Option<RawValue>,
    pub fifty_two_week_low: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyStatisticsModule {
    pub trailing_eps: Option<RawValue>,
    pub book_value: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryProfileModule {
    pub sector: Option<String>,
    pub industry: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_raw_value() {
        let value: RawValue = serde_json::from_str(r#"{"raw": 38.52, "fmt": "38.52"}"#).unwrap();
        assert_eq!(value.raw, Some(38.52));
    }

    #[test]
    fn test_deserialize_empty_object_as_missing() {
        let value: RawValue = serde_json::from_str("{}").unwrap();
        assert_eq!(value.raw, None);
    }

    #[test]
    fn test_deserialize_price_module() {
        let json = r#"{
            "currency": "BRL",
            "shortName": "PETROBRAS PN",
            "marketState": "REGULAR",
            "regularMarketPrice": {"raw": 38.52, "fmt": "38.52"},
            "regularMarketPreviousClose": {"raw": 38.10, "fmt": "38.10"},
            "regularMarketVolume": {"raw": 45123400, "fmt": "45.12M"},
            "regularMarketTime": 1717171717
        }"#;
        let price: PriceModule = serde_json::from_str(json).unwrap();
        assert_eq!(price.currency.as_deref(), Some("BRL"));
        assert_eq!(price.market_state.as_deref(), Some("REGULAR"));
        assert_eq!(price.regular_market_price.and_then(|v| v.raw), Some(38.52));
        assert_eq!(
            price.regular_market_previous_close.and_then(|v| v.raw),
            Some(38.10)
        );
    }

    #[test]
    fn test_deserialize_summary_detail() {
        let json = r#"{
            "marketCap": {"raw": 500000000000.0},
            "trailingPE": {"raw": 4.2},
            "dividendYield": {"raw": 0.12},
            "fiftyTwoWeekHigh": {"raw": 42.0},
            "fiftyTwoWeekLow": {"raw": 30.9}
        }"#;
        let detail: SummaryDetailModule = serde_json::from_str(json).unwrap();
        assert_eq!(detail.trailing_pe.and_then(|v| v.raw), Some(4.2));
        assert_eq!(detail.fifty_two_week_low.and_then(|v| v.raw), Some(30.9));
    }

    #[test]
    fn test_deserialize_full_response_with_missing_modules() {
        let json = r#"{
            "quoteSummary": {
                "result": [{
                    "price": {"currency": "BRL"},
                    "summaryDetail": null
                }],
                "error": null
            }
        }"#;
        let response: QuoteSummaryResponse = serde_json::from_str(json).unwrap();
        let result = response.quote_summary.result.first().unwrap();
        assert!(result.price.is_some());
        assert!(result.summary_detail.is_none());
        assert!(result.summary_profile.is_none());
    }
}
