//! Environment-driven configuration with safe defaults.
//!
//! Every knob reads from a `MARKET_DATA_` prefixed variable; unset or
//! unparseable values fall back to the default silently so a bad deployment
//! variable can never take the service down.

use std::time::Duration;

/// Tunables for the aggregation service.
#[derive(Clone, Debug)]
pub struct AggregatorConfig {
    /// Admissions allowed per caller per window.
    pub max_requests: u32,
    /// Length of the rate-limit window.
    pub window: Duration,
    /// Default TTL for quote and trending-adjacent caches.
    pub cache_ttl: Duration,
    /// Validation results live this many times longer than `cache_ttl`.
    pub validation_ttl_factor: u32,
    /// TTL for the trending list.
    pub trending_ttl: Duration,
    /// TTL for search results. `None` leaves search uncached.
    pub search_cache_ttl: Option<Duration>,
    /// Per-attempt provider deadline.
    pub provider_timeout: Duration,
    /// Maximum provider attempts per call.
    pub max_retries: u32,
    /// Base delay for linear retry backoff.
    pub retry_base_delay: Duration,
    /// Symbols fetched in parallel during bulk fan-out.
    pub bulk_concurrency: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            max_requests: 60,
            window: Duration::from_secs(60),
            cache_ttl: Duration::from_secs(120),
            validation_ttl_factor: 4,
            trending_ttl: Duration::from_secs(60),
            search_cache_ttl: None,
            provider_timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_base_delay: Duration::from_millis(1000),
            bulk_concurrency: 5,
        }
    }
}

impl AggregatorConfig {
    /// Loads configuration from the environment, keeping defaults for
    /// anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_requests: env_parse("MARKET_DATA_MAX_REQUESTS", defaults.max_requests),
            window: Duration::from_secs(env_parse(
                "MARKET_DATA_WINDOW_SECS",
                defaults.window.as_secs(),
            )),
            cache_ttl: Duration::from_secs(env_parse(
                "MARKET_DATA_CACHE_TTL_SECS",
                defaults.cache_ttl.as_secs(),
            )),
            validation_ttl_factor: env_parse(
                "MARKET_DATA_VALIDATION_TTL_FACTOR",
                defaults.validation_ttl_factor,
            ),
            trending_ttl: Duration::from_secs(env_parse(
                "MARKET_DATA_TRENDING_TTL_SECS",
                defaults.trending_ttl.as_secs(),
            )),
            search_cache_ttl: std::env::var("MARKET_DATA_SEARCH_CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs),
            provider_timeout: Duration::from_secs(env_parse(
                "MARKET_DATA_PROVIDER_TIMEOUT_SECS",
                defaults.provider_timeout.as_secs(),
            )),
            max_retries: env_parse("MARKET_DATA_MAX_RETRIES", defaults.max_retries),
            retry_base_delay: Duration::from_millis(env_parse(
                "MARKET_DATA_RETRY_BASE_DELAY_MS",
                defaults.retry_base_delay.as_millis() as u64,
            )),
            bulk_concurrency: env_parse("MARKET_DATA_BULK_CONCURRENCY", defaults.bulk_concurrency),
        }
    }

    /// TTL applied to cached validation results.
    pub fn validation_ttl(&self) -> Duration {
        self.cache_ttl * self.validation_ttl_factor
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
