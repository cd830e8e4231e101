//! Aggregation orchestrator.
//!
//! [`MarketDataService`] is the crate's call surface. Every operation runs
//! the same pipeline: request validation, per-caller admission, cache lookup,
//! provider fetch, cache populate. The provider is injected behind
//! [`QuoteProvider`] and all cache/limiter state is per-instance.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use futures::future::join_all;
use log::{debug, info, warn};

use crate::cache::{cache_key, TtlCache};
use crate::config::AggregatorConfig;
use crate::errors::MarketDataError;
use crate::limiter::SlidingWindowLimiter;
use crate::models::{
    BulkError, BulkResult, Candidate, HealthReport, InstrumentData, InstrumentRequest, Interval,
    Period, ProbeStatus, RequestedRange, ValidationResult,
};
use crate::provider::{QuoteProvider, RetryPolicy, YahooProvider};
use crate::symbol::{normalize, Market, NormalizedSymbol};

/// Symbol probed by the provider half of the health check.
const HEALTH_PROBE_SYMBOL: &str = "PETR4.SA";

/// Market-data aggregation service.
pub struct MarketDataService {
    provider: Arc<dyn QuoteProvider>,
    quote_cache: TtlCache<InstrumentData>,
    search_cache: TtlCache<Vec<Candidate>>,
    trending_cache: TtlCache<Vec<Candidate>>,
    validation_cache: TtlCache<ValidationResult>,
    limiter: SlidingWindowLimiter,
    config: AggregatorConfig,
}

impl MarketDataService {
    /// Builds a service around an injected provider.
    pub fn new(provider: Arc<dyn QuoteProvider>, config: AggregatorConfig) -> Self {
        let limiter = SlidingWindowLimiter::new(config.max_requests, config.window);
        Self {
            provider,
            quote_cache: TtlCache::new(),
            search_cache: TtlCache::new(),
            trending_cache: TtlCache::new(),
            validation_cache: TtlCache::new(),
            limiter,
            config,
        }
    }

    /// Convenience constructor wiring up the Yahoo provider with a retry
    /// policy derived from the configuration.
    pub fn with_yahoo(config: AggregatorConfig) -> Result<Self, MarketDataError> {
        let retry = RetryPolicy {
            max_attempts: config.max_retries,
            base_delay: config.retry_base_delay,
            timeout: config.provider_timeout,
        };
        let provider = YahooProvider::new(retry)?;
        Ok(Self::new(Arc::new(provider), config))
    }

    fn admit(&self, key: &str) -> Result<(), MarketDataError> {
        if self.limiter.is_allowed(key) {
            return Ok(());
        }
        Err(MarketDataError::RateLimited {
            caller_id: key.to_string(),
            remaining: self.limiter.remaining(key),
            retry_after: self.limiter.retry_after(key),
        })
    }

    /// Full single-instrument fetch. Validates, admits, then serves from
    /// cache or the provider.
    pub async fn get_quote(
        &self,
        request: &InstrumentRequest,
        caller_id: &str,
    ) -> Result<InstrumentData, MarketDataError> {
        request.validate()?;
        self.admit(caller_id)?;

        let symbol = normalize(&request.symbol);
        self.fetch_instrument(&symbol, request).await
    }

    /// Cache-or-provider path shared by `get_quote` and `bulk`. Admission is
    /// the caller's responsibility.
    async fn fetch_instrument(
        &self,
        symbol: &NormalizedSymbol,
        request: &InstrumentRequest,
    ) -> Result<InstrumentData, MarketDataError> {
        let flags = format!(
            "{}{}",
            u8::from(request.include_fundamentals),
            u8::from(request.include_history)
        );
        let key = cache_key(
            "quote",
            &[
                symbol.as_str(),
                &request.range_key(),
                request.interval.as_str(),
                &flags,
            ],
        );

        if let Some(data) = self.quote_cache.get(&key) {
            debug!("Cache hit for {}", key);
            return Ok(data);
        }

        let snapshot = self.provider.fetch_quote(symbol).await?;

        let fundamentals = if request.include_fundamentals {
            Some(self.provider.fetch_fundamentals(symbol).await?)
        } else {
            None
        };

        let history = if request.include_history {
            let (start, end) = Self::resolve_dates(request);
            self.provider
                .fetch_history(symbol, start, end, request.interval)
                .await?
        } else {
            Vec::new()
        };

        let data = InstrumentData {
            snapshot,
            fundamentals,
            history,
        };
        self.quote_cache.set(key, data.clone(), self.config.cache_ttl);
        Ok(data)
    }

    fn resolve_dates(request: &InstrumentRequest) -> (NaiveDate, NaiveDate) {
        let today = Utc::now().date_naive();
        match request.effective_range() {
            RequestedRange::Explicit { start, end } => (start, end.unwrap_or(today)),
            RequestedRange::Named(period) => (
                today - chrono::Duration::days(period.approximate_days()),
                today,
            ),
        }
    }

    /// Free-text instrument search. Results are cached only when a search
    /// TTL is configured.
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
        caller_id: &str,
    ) -> Result<Vec<Candidate>, MarketDataError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(MarketDataError::Validation(
                "search query must not be empty".to_string(),
            ));
        }
        self.admit(caller_id)?;

        let key = cache_key("search", &[&query.to_lowercase(), &limit.to_string()]);
        if self.config.search_cache_ttl.is_some() {
            if let Some(results) = self.search_cache.get(&key) {
                debug!("Cache hit for {}", key);
                return Ok(results);
            }
        }

        let results = self.provider.search(query, limit).await?;
        if let Some(ttl) = self.config.search_cache_ttl {
            self.search_cache.set(key, results.clone(), ttl);
        }
        Ok(results)
    }

    /// Most-active instruments for a market, cached briefly.
    pub async fn trending(
        &self,
        market: Market,
        limit: usize,
        caller_id: &str,
    ) -> Result<Vec<Candidate>, MarketDataError> {
        self.admit(caller_id)?;

        let key = cache_key("trending", &[&market.to_string(), &limit.to_string()]);
        if let Some(results) = self.trending_cache.get(&key) {
            debug!("Cache hit for {}", key);
            return Ok(results);
        }

        let results = self.provider.trending(market, limit).await?;
        self.trending_cache
            .set(key, results.clone(), self.config.trending_ttl);
        Ok(results)
    }

    /// Fetches many instruments with bounded parallelism.
    ///
    /// The batch is admitted once against the caller's bulk key. Per-symbol
    /// failures land in the error partition; only an empty request or bulk
    /// rate limiting fail the batch as a whole.
    pub async fn bulk(
        &self,
        symbols: &[String],
        period: Option<Period>,
        interval: Interval,
        caller_id: &str,
    ) -> Result<BulkResult, MarketDataError> {
        if symbols.is_empty() {
            return Err(MarketDataError::Validation(
                "symbol list must not be empty".to_string(),
            ));
        }
        self.admit(&SlidingWindowLimiter::bulk_key(caller_id))?;

        let started = Instant::now();

        let mut data = HashMap::new();
        let mut errors: HashMap<String, BulkError> = HashMap::new();

        // Partitions are keyed by the symbol exactly as the caller sent it;
        // normalization only feeds the provider call and the cache key.
        // Duplicate inputs collapse to one entry. Empty symbols are settled
        // up front; the rest fan out in chunks.
        let mut seen = HashSet::new();
        let mut fetchable: Vec<(String, NormalizedSymbol)> = Vec::new();
        for raw in symbols {
            if !seen.insert(raw.clone()) {
                continue;
            }
            if raw.trim().is_empty() {
                let error = MarketDataError::Validation("symbol must not be empty".to_string());
                errors.insert(raw.clone(), BulkError::from(&error));
            } else {
                fetchable.push((raw.clone(), normalize(raw)));
            }
        }

        for chunk in fetchable.chunks(self.config.bulk_concurrency.max(1)) {
            let futures: Vec<_> = chunk
                .iter()
                .map(|(key, symbol)| {
                    let request = InstrumentRequest {
                        symbol: symbol.symbol.clone(),
                        period,
                        start: None,
                        end: None,
                        interval,
                        include_fundamentals: false,
                        include_history: period.is_some(),
                    };
                    async move {
                        let result = self.fetch_instrument(symbol, &request).await;
                        (key.clone(), result)
                    }
                })
                .collect();

            for (key, result) in join_all(futures).await {
                match result {
                    Ok(instrument) => {
                        data.insert(key, instrument);
                    }
                    Err(error) => {
                        warn!("Bulk fetch failed for {}: {}", key, error);
                        errors.insert(key, BulkError::from(&error));
                    }
                }
            }
        }

        let result = BulkResult::new(data, errors, started.elapsed().as_millis() as u64);
        info!(
            "Bulk request {} for '{}': {} succeeded, {} failed in {} ms",
            result.request_id, caller_id, result.success_count, result.failure_count,
            result.elapsed_ms
        );
        Ok(result)
    }

    /// Checks that a symbol exists and is tradable. Results are cached
    /// longer than quotes since listings change slowly.
    pub async fn validate_ticker(
        &self,
        symbol: &str,
        caller_id: &str,
    ) -> Result<ValidationResult, MarketDataError> {
        if symbol.trim().is_empty() {
            return Err(MarketDataError::Validation(
                "symbol must not be empty".to_string(),
            ));
        }
        self.admit(caller_id)?;
        let normalized = normalize(symbol);

        let key = cache_key("validate", &[normalized.as_str()]);
        if let Some(result) = self.validation_cache.get(&key) {
            debug!("Cache hit for {}", key);
            return Ok(result);
        }

        let result = self.provider.validate(&normalized).await?;
        self.validation_cache
            .set(key, result.clone(), self.config.validation_ttl());
        Ok(result)
    }

    /// Probes the cache and the provider. Always returns a report; probe
    /// failures degrade the status instead of erroring.
    pub async fn health_check(&self) -> HealthReport {
        let sentinel_key = "health:sentinel";
        self.validation_cache.delete(sentinel_key);
        let probe = ValidationResult::invalid(sentinel_key, Market::Unknown, vec![], "sentinel");
        self.validation_cache
            .set(sentinel_key, probe, self.config.cache_ttl);
        let cache_status = if self.validation_cache.get(sentinel_key).is_some() {
            ProbeStatus::Healthy
        } else {
            ProbeStatus::Unhealthy
        };
        self.validation_cache.delete(sentinel_key);

        let probe_symbol = normalize(HEALTH_PROBE_SYMBOL);
        let provider_status = match self.provider.validate(&probe_symbol).await {
            Ok(result) if result.is_valid => ProbeStatus::Healthy,
            Ok(_) => ProbeStatus::Degraded,
            Err(error) => {
                warn!("Health probe against provider failed: {}", error);
                ProbeStatus::Unhealthy
            }
        };

        HealthReport::new(cache_status, provider_status)
    }

    /// Drops every cached entry. Idempotent.
    pub fn clear_cache(&self) -> bool {
        let cleared = self.quote_cache.clear()
            && self.search_cache.clear()
            && self.trending_cache.clear()
            && self.validation_cache.clear();
        info!("All caches cleared");
        cleared
    }
}
