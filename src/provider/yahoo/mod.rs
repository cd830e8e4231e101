//! Yahoo Finance provider.
//!
//! Two upstream surfaces are combined: the quoteSummary HTTP endpoint
//! (snapshot prices, fundamentals, validation; requires the crumb/cookie
//! authentication dance) and the `yahoo_finance_api` connector (historical
//! series and ticker search).

mod models;
pub mod reference;

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use lazy_static::lazy_static;
use log::{debug, warn};
use num_traits::FromPrimitive;
use reqwest::header;
use rust_decimal::Decimal;
use time::OffsetDateTime;
use urlencoding::encode;
use yahoo_finance_api as yahoo;

use crate::errors::{MarketDataError, ProviderErrorCode};
use crate::models::{
    Candidate, FundamentalData, HistoricalPoint, Interval, QuoteSnapshot, ValidationResult,
};
use crate::provider::{QuoteProvider, RetryPolicy};
use crate::symbol::{classify_market, Market, NormalizedSymbol};

use models::{PriceModule, QuoteSummaryResponse, QuoteSummaryResult};

const PROVIDER_ID: &str = "YAHOO";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Symbols fetched in parallel per trending batch.
const TRENDING_BATCH_SIZE: usize = 5;

// ============================================================================
// Crumb/Cookie Authentication
// ============================================================================

/// Cached Yahoo authentication data
#[derive(Debug, Clone)]
struct CrumbData {
    cookie: String,
    crumb: String,
}

lazy_static! {
    /// Process-wide cache for the Yahoo authentication crumb
    static ref YAHOO_CRUMB: RwLock<Option<CrumbData>> = RwLock::default();
}

// ============================================================================
// Yahoo Provider
// ============================================================================

/// Yahoo Finance market data provider.
pub struct YahooProvider {
    connector: yahoo::YahooConnector,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl YahooProvider {
    /// Creates a provider whose calls run under `retry`.
    pub fn new(retry: RetryPolicy) -> Result<Self, MarketDataError> {
        let connector = yahoo::YahooConnector::new().map_err(|e| {
            MarketDataError::provider(
                PROVIDER_ID,
                ProviderErrorCode::FetchFailed,
                format!("Failed to initialize Yahoo connector: {}", e),
            )
        })?;
        Ok(Self {
            connector,
            client: reqwest::Client::new(),
            retry,
        })
    }

    // ========================================================================
    // Crumb/Cookie Authentication
    // ========================================================================

    /// Returns a valid authentication crumb, fetching one if not cached.
    async fn ensure_crumb(&self) -> Result<CrumbData, MarketDataError> {
        {
            let guard = YAHOO_CRUMB.read().unwrap_or_else(|p| p.into_inner());
            if let Some(crumb) = guard.as_ref() {
                return Ok(crumb.clone());
            }
        }
        self.fetch_crumb().await
    }

    async fn fetch_crumb(&self) -> Result<CrumbData, MarketDataError> {
        // Step 1: cookie from fc.yahoo.com
        let response = self.client.get("https://fc.yahoo.com").send().await?;

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.split_once(';').map(|(v, _)| v.to_string()))
            .ok_or_else(|| {
                MarketDataError::provider(
                    PROVIDER_ID,
                    ProviderErrorCode::ParseError,
                    "Failed to parse Yahoo cookie",
                )
            })?;

        // Step 2: crumb using the cookie
        let crumb = self
            .client
            .get("https://query1.finance.yahoo.com/v1/test/getcrumb")
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::COOKIE, &cookie)
            .send()
            .await?
            .text()
            .await?;

        let crumb_data = CrumbData { cookie, crumb };

        let mut guard = YAHOO_CRUMB.write().unwrap_or_else(|p| p.into_inner());
        *guard = Some(crumb_data.clone());

        Ok(crumb_data)
    }

    /// Clears the cached crumb after an authentication failure.
    fn clear_crumb(&self) {
        let mut guard = YAHOO_CRUMB.write().unwrap_or_else(|p| p.into_inner());
        *guard = None;
    }

    // ========================================================================
    // quoteSummary Endpoint
    // ========================================================================

    /// One quoteSummary request for `symbol` with the given module list.
    /// Unknown symbols surface as `SymbolNotFound`.
    async fn quote_summary(
        &self,
        symbol: &str,
        modules: &str,
    ) -> Result<QuoteSummaryResult, MarketDataError> {
        let crumb = self.ensure_crumb().await?;

        let url = format!(
            "https://query1.finance.yahoo.com/v10/finance/quoteSummary/{}?modules={}&crumb={}",
            encode(symbol),
            modules,
            encode(&crumb.crumb)
        );

        let response = self
            .client
            .get(&url)
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::COOKIE, &crumb.cookie)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            self.clear_crumb();
            return Err(MarketDataError::provider(
                PROVIDER_ID,
                ProviderErrorCode::FetchFailed,
                "Yahoo authentication expired",
            ));
        }
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(MarketDataError::provider(
                PROVIDER_ID,
                ProviderErrorCode::SymbolNotFound,
                symbol,
            ));
        }

        let data: QuoteSummaryResponse = response.json().await.map_err(|e| {
            MarketDataError::provider(
                PROVIDER_ID,
                ProviderErrorCode::ParseError,
                format!("Failed to parse quoteSummary response: {}", e),
            )
        })?;

        data.quote_summary.result.into_iter().next().ok_or_else(|| {
            MarketDataError::provider(PROVIDER_ID, ProviderErrorCode::SymbolNotFound, symbol)
        })
    }

    fn price_to_snapshot(symbol: &str, price: &PriceModule) -> QuoteSnapshot {
        let as_of = price
            .regular_market_time
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .unwrap_or_else(Utc::now);

        QuoteSnapshot {
            symbol: symbol.to_string(),
            name: price.long_name.clone().or_else(|| price.short_name.clone()),
            price: price
                .regular_market_price
                .as_ref()
                .and_then(|v| v.raw)
                .and_then(Decimal::from_f64_retain),
            previous_close: price
                .regular_market_previous_close
                .as_ref()
                .and_then(|v| v.raw)
                .and_then(Decimal::from_f64_retain),
            change: None,
            change_percent: None,
            volume: price
                .regular_market_volume
                .as_ref()
                .and_then(|v| v.raw)
                .and_then(Decimal::from_f64_retain),
            currency: price.currency.clone(),
            market_state: price.market_state.clone(),
            as_of,
        }
        .with_derived_change()
    }

    /// Snapshot via the quoteSummary price module.
    async fn fetch_quote_primary(&self, symbol: &str) -> Result<QuoteSnapshot, MarketDataError> {
        let result = self.quote_summary(symbol, "price").await?;
        let price = result.price.as_ref().ok_or_else(|| {
            MarketDataError::provider(PROVIDER_ID, ProviderErrorCode::SymbolNotFound, symbol)
        })?;
        Ok(Self::price_to_snapshot(symbol, price))
    }

    /// Snapshot via the library connector. Carries no previous close, so the
    /// derived change fields stay empty.
    async fn fetch_quote_backup(&self, symbol: &str) -> Result<QuoteSnapshot, MarketDataError> {
        let response = self
            .connector
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| map_yahoo_error(symbol, e))?;

        let quote = response.last_quote().map_err(|e| {
            warn!("No quotes returned for {}: {}", symbol, e);
            MarketDataError::provider(PROVIDER_ID, ProviderErrorCode::SymbolNotFound, symbol)
        })?;

        Ok(QuoteSnapshot {
            symbol: symbol.to_string(),
            name: None,
            price: Decimal::from_f64_retain(quote.close),
            previous_close: None,
            change: None,
            change_percent: None,
            volume: Decimal::from_u64(quote.volume),
            currency: None,
            market_state: None,
            as_of: Utc
                .timestamp_opt(quote.timestamp as i64, 0)
                .single()
                .unwrap_or_else(Utc::now),
        })
    }

    async fn fetch_quote_once(&self, symbol: &str) -> Result<QuoteSnapshot, MarketDataError> {
        match self.fetch_quote_primary(symbol).await {
            Ok(snapshot) => Ok(snapshot),
            Err(error) if matches!(error.retry_class(), crate::errors::RetryClass::Terminal) => {
                Err(error)
            }
            Err(error) => {
                debug!(
                    "Primary quote fetch failed for {}: {}, trying backup",
                    symbol, error
                );
                self.fetch_quote_backup(symbol).await
            }
        }
    }

    // ========================================================================
    // History
    // ========================================================================

    fn naive_date_to_offset(date: NaiveDate, end_of_day: bool) -> OffsetDateTime {
        let timestamp = date
            .and_hms_opt(if end_of_day { 23 } else { 0 }, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or_default();
        OffsetDateTime::from_unix_timestamp(timestamp)
            .unwrap_or_else(|_| OffsetDateTime::now_utc())
    }

    fn yahoo_quote_to_point(quote: yahoo::Quote) -> Option<HistoricalPoint> {
        let date = Utc
            .timestamp_opt(quote.timestamp as i64, 0)
            .single()?
            .date_naive();
        let close = Decimal::from_f64_retain(quote.close)?;
        Some(HistoricalPoint {
            date,
            open: Decimal::from_f64_retain(quote.open),
            high: Decimal::from_f64_retain(quote.high),
            low: Decimal::from_f64_retain(quote.low),
            close,
            adj_close: Decimal::from_f64_retain(quote.adjclose),
            volume: Decimal::from_u64(quote.volume),
        })
    }

    async fn fetch_history_once(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
    ) -> Result<Vec<HistoricalPoint>, MarketDataError> {
        let start_time = Self::naive_date_to_offset(start, false);
        let end_time = Self::naive_date_to_offset(end, true);

        let response = self
            .connector
            .get_quote_history_interval(symbol, start_time, end_time, interval.as_str())
            .await;

        let response = match response {
            Ok(response) => response,
            // An empty range is a valid result, not a failure.
            Err(yahoo::YahooError::NoQuotes) => {
                warn!(
                    "No historical quotes for '{}' between {} and {}",
                    symbol, start, end
                );
                return Ok(vec![]);
            }
            Err(e) => return Err(map_yahoo_error(symbol, e)),
        };

        let mut points: Vec<HistoricalPoint> = match response.quotes() {
            Ok(quotes) => quotes
                .into_iter()
                .filter_map(|q| {
                    let point = Self::yahoo_quote_to_point(q);
                    if point.is_none() {
                        warn!("Skipping bar with unconvertible values for {}", symbol);
                    }
                    point
                })
                .collect(),
            Err(yahoo::YahooError::NoQuotes) => vec![],
            Err(e) => return Err(map_yahoo_error(symbol, e)),
        };

        points.sort_by_key(|p| p.date);
        Ok(points)
    }

    // ========================================================================
    // Fundamentals
    // ========================================================================

    async fn fetch_fundamentals_once(
        &self,
        symbol: &str,
    ) -> Result<FundamentalData, MarketDataError> {
        let result = self
            .quote_summary(
                symbol,
                "summaryDetail,defaultKeyStatistics,summaryProfile",
            )
            .await?;

        let detail = result.summary_detail.as_ref();
        let stats = result.default_key_statistics.as_ref();
        let profile = result.summary_profile.as_ref();

        Ok(FundamentalData {
            market_cap: detail.and_then(|d| d.market_cap.as_ref()).and_then(|v| v.raw),
            pe_ratio: detail.and_then(|d| d.trailing_pe.as_ref()).and_then(|v| v.raw),
            dividend_yield: detail
                .and_then(|d| d.dividend_yield.as_ref())
                .and_then(|v| v.raw),
            eps: stats.and_then(|s| s.trailing_eps.as_ref()).and_then(|v| v.raw),
            book_value: stats.and_then(|s| s.book_value.as_ref()).and_then(|v| v.raw),
            week_52_high: detail
                .and_then(|d| d.fifty_two_week_high.as_ref())
                .and_then(|v| v.raw),
            week_52_low: detail
                .and_then(|d| d.fifty_two_week_low.as_ref())
                .and_then(|v| v.raw),
            sector: profile.and_then(|p| p.sector.as_ref()).map(|s| format_sector(s)),
            industry: profile.and_then(|p| p.industry.clone()),
        })
    }

    // ========================================================================
    // Validation
    // ========================================================================

    async fn validate_once(
        &self,
        symbol: &NormalizedSymbol,
    ) -> Result<ValidationResult, MarketDataError> {
        let result = match self.quote_summary(symbol.as_str(), "price").await {
            Ok(result) => result,
            Err(MarketDataError::Provider {
                code: ProviderErrorCode::SymbolNotFound,
                ..
            }) => {
                return Ok(ValidationResult::invalid(
                    symbol.as_str(),
                    symbol.market,
                    reference::suggestions_for(symbol.as_str()),
                    "symbol not found",
                ));
            }
            Err(error) => return Err(error),
        };

        let price = result.price.as_ref();
        let has_price = price
            .and_then(|p| p.regular_market_price.as_ref())
            .and_then(|v| v.raw)
            .is_some();
        let market_state = price.and_then(|p| p.market_state.clone());
        let last_trade = price
            .and_then(|p| p.regular_market_time)
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .map(|dt| dt.date_naive());

        if !has_price {
            return Ok(ValidationResult::invalid(
                symbol.as_str(),
                symbol.market,
                reference::suggestions_for(symbol.as_str()),
                "no market price available",
            ));
        }

        Ok(ValidationResult {
            symbol: symbol.symbol.clone(),
            is_valid: true,
            // The upstream tradeable flag is unreliable; a present price in a
            // known market state is the working definition.
            tradable: market_state.is_some(),
            market: symbol.market,
            last_trade,
            suggestions: vec![],
            error_message: None,
            checked_at: Utc::now(),
        })
    }
}

// ============================================================================
// QuoteProvider Implementation
// ============================================================================

#[async_trait]
impl QuoteProvider for YahooProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_quote(
        &self,
        symbol: &NormalizedSymbol,
    ) -> Result<QuoteSnapshot, MarketDataError> {
        debug!("Fetching latest quote for {} from Yahoo", symbol);
        self.retry
            .run(PROVIDER_ID, "quote", || self.fetch_quote_once(symbol.as_str()))
            .await
    }

    async fn fetch_history(
        &self,
        symbol: &NormalizedSymbol,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
    ) -> Result<Vec<HistoricalPoint>, MarketDataError> {
        debug!(
            "Fetching {} history for {} from {} to {} from Yahoo",
            interval.as_str(),
            symbol,
            start,
            end
        );
        self.retry
            .run(PROVIDER_ID, "history", || {
                self.fetch_history_once(symbol.as_str(), start, end, interval)
            })
            .await
    }

    async fn fetch_fundamentals(
        &self,
        symbol: &NormalizedSymbol,
    ) -> Result<FundamentalData, MarketDataError> {
        debug!("Fetching fundamentals for {} from Yahoo", symbol);
        self.retry
            .run(PROVIDER_ID, "fundamentals", || {
                self.fetch_fundamentals_once(symbol.as_str())
            })
            .await
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Candidate>, MarketDataError> {
        debug!("Searching Yahoo for '{}'", query);

        let encoded_query = encode(query);
        let result = self
            .retry
            .run(PROVIDER_ID, "search", || async {
                self.connector
                    .search_ticker(&encoded_query)
                    .await
                    .map_err(|e| map_yahoo_error(query, e))
            })
            .await?;

        let mut candidates: Vec<Candidate> = result
            .quotes
            .iter()
            .map(|item| {
                let name = if item.long_name.is_empty() {
                    item.short_name.clone()
                } else {
                    item.long_name.clone()
                };
                Candidate::new(&item.symbol, name, classify_market(&item.symbol))
                    .with_score(item.score)
            })
            .collect();

        // Fold in B3 reference matches the upstream search tends to miss.
        for stock in reference::B3_REFERENCE.iter() {
            let score = reference::relevance_score(query, stock);
            if score > 0.0 && !candidates.iter().any(|c| c.symbol == stock.symbol) {
                let mut candidate = Candidate::new(stock.symbol, stock.name, Market::B3)
                    .with_score(score);
                candidate.sector = Some(stock.sector.to_string());
                candidates.push(candidate);
            }
        }

        candidates.sort_by(|a, b| {
            b.score
                .unwrap_or(0.0)
                .partial_cmp(&a.score.unwrap_or(0.0))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        candidates.truncate(limit);
        Ok(candidates)
    }

    async fn trending(
        &self,
        market: Market,
        limit: usize,
    ) -> Result<Vec<Candidate>, MarketDataError> {
        if market != Market::B3 {
            return Ok(vec![]);
        }

        // Bounded fan-out over the watchlist; each sub-fetch runs under the
        // retry policy (per-attempt timeout included) and individual
        // failures are skipped so one bad symbol cannot empty the list.
        let mut snapshots: Vec<QuoteSnapshot> = Vec::new();
        for chunk in reference::B3_WATCHLIST.chunks(TRENDING_BATCH_SIZE) {
            let futures: Vec<_> = chunk
                .iter()
                .map(|symbol| {
                    self.retry
                        .run(PROVIDER_ID, "trending", || self.fetch_quote_once(symbol))
                })
                .collect();
            for (symbol, result) in chunk.iter().zip(futures::future::join_all(futures).await) {
                match result {
                    Ok(snapshot) => snapshots.push(snapshot),
                    Err(error) => warn!("Skipping trending symbol {}: {}", symbol, error),
                }
            }
        }

        snapshots.sort_by(|a, b| {
            b.volume
                .unwrap_or_default()
                .cmp(&a.volume.unwrap_or_default())
        });

        let sectors = &reference::B3_REFERENCE;
        let candidates = snapshots
            .into_iter()
            .take(limit)
            .map(|snapshot| {
                let sector = sectors
                    .iter()
                    .find(|s| s.symbol == snapshot.symbol)
                    .map(|s| s.sector.to_string());
                Candidate {
                    symbol: snapshot.symbol.clone(),
                    name: snapshot.name.unwrap_or_else(|| snapshot.symbol.clone()),
                    market: Market::B3,
                    sector,
                    currency: snapshot.currency,
                    current_price: snapshot.price,
                    change_percent: snapshot.change_percent,
                    score: None,
                }
            })
            .collect();

        Ok(candidates)
    }

    async fn validate(
        &self,
        symbol: &NormalizedSymbol,
    ) -> Result<ValidationResult, MarketDataError> {
        debug!("Validating {} against Yahoo", symbol);
        self.retry
            .run(PROVIDER_ID, "validate", || self.validate_once(symbol))
            .await
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn map_yahoo_error(symbol: &str, error: yahoo::YahooError) -> MarketDataError {
    let code = match error {
        yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult => {
            return MarketDataError::provider(
                PROVIDER_ID,
                ProviderErrorCode::SymbolNotFound,
                symbol,
            )
        }
        yahoo::YahooError::DeserializeFailed(_) => ProviderErrorCode::ParseError,
        _ => ProviderErrorCode::FetchFailed,
    };
    MarketDataError::provider(PROVIDER_ID, code, error.to_string())
}

/// Convert snake_case sector names to Title Case.
fn format_sector(sector: &str) -> String {
    sector
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().chain(chars).collect(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// Tests
// ============================================================================
