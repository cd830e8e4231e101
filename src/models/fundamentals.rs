use serde::{Deserialize, Serialize};

/// Valuation and profile figures for one instrument.
///
/// Every field is optional: a value the provider does not report stays `None`
/// and is omitted from serialized output. Missing data is never rendered as
/// zero.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FundamentalData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pe_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dividend_yield: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week_52_high: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week_52_low: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
}

impl FundamentalData {
    /// Whether any field carries data.
    pub fn is_empty(&self) -> bool {
        self.market_cap.is_none()
            && self.pe_ratio.is_none()
            && self.dividend_yield.is_none()
            && self.eps.is_none()
            && self.book_value.is_none()
            && self.week_52_high.is_none()
            && self.week_52_low.is_none()
            && self.sector.is_none()
            && self.industry.is_none()
    }
}
