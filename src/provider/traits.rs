use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::MarketDataError;
use crate::models::{
    Candidate, FundamentalData, HistoricalPoint, Interval, QuoteSnapshot, ValidationResult,
};
use crate::symbol::{Market, NormalizedSymbol};

/// Upstream market-data source.
///
/// Implementations take already-normalized symbols and surface every failure
/// as a [`MarketDataError::Provider`] variant; raw transport errors must not
/// escape. All methods are one logical upstream call (retry and timeout
/// handling live inside the implementation).
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Stable provider identifier (e.g. "YAHOO").
    fn id(&self) -> &'static str;

    /// Current price snapshot for one instrument.
    async fn fetch_quote(
        &self,
        symbol: &NormalizedSymbol,
    ) -> Result<QuoteSnapshot, MarketDataError>;

    /// Historical series for a date range, ascending by date. An empty series
    /// is a valid result.
    async fn fetch_history(
        &self,
        symbol: &NormalizedSymbol,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
    ) -> Result<Vec<HistoricalPoint>, MarketDataError>;

    /// Valuation and profile figures. Fields the source does not report stay
    /// `None`.
    async fn fetch_fundamentals(
        &self,
        symbol: &NormalizedSymbol,
    ) -> Result<FundamentalData, MarketDataError>;

    /// Free-text instrument search.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Candidate>, MarketDataError>;

    /// Most-active instruments for a market. Markets without a curated
    /// watchlist return an empty list.
    async fn trending(
        &self,
        market: Market,
        limit: usize,
    ) -> Result<Vec<Candidate>, MarketDataError>;

    /// Existence and tradability probe. Unknown symbols are a negative
    /// result, not an error.
    async fn validate(
        &self,
        symbol: &NormalizedSymbol,
    ) -> Result<ValidationResult, MarketDataError>;
}
