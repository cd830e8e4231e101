//! Error types and retry classification for the aggregation engine.
//!
//! This module provides:
//! - [`MarketDataError`]: the error enum shared by every public operation
//! - [`ProviderErrorCode`]: machine-readable codes for upstream failures
//! - [`RetryClass`]: classification driving the provider retry loop

mod retry;

pub use retry::RetryClass;

use std::time::Duration;

use thiserror::Error;

/// Machine-readable error codes for provider failures.
///
/// Carried inside [`MarketDataError::Provider`] so callers can react to the
/// failure mode without parsing message strings.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProviderErrorCode {
    /// The provider does not know the requested symbol.
    SymbolNotFound,
    /// A single attempt exceeded the configured provider timeout.
    Timeout,
    /// The transport layer failed (connect, TLS, 5xx, upstream throttle).
    FetchFailed,
    /// The provider answered but the payload could not be decoded.
    ParseError,
    /// The provider does not implement the requested operation.
    NotSupported,
}

impl std::fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::SymbolNotFound => "SYMBOL_NOT_FOUND",
            Self::Timeout => "TIMEOUT",
            Self::FetchFailed => "FETCH_FAILED",
            Self::ParseError => "PARSE_ERROR",
            Self::NotSupported => "NOT_SUPPORTED",
        };
        f.write_str(s)
    }
}

/// Errors surfaced by the aggregation engine.
///
/// The taxonomy separates expected, recoverable outcomes (rate limiting,
/// malformed input) from upstream failures and internal faults. Cache faults
/// never appear here: they are downgraded to cache misses inside the cache
/// module.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The caller supplied a malformed request (HTTP-equivalent 400).
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Admission was denied by the sliding-window limiter (HTTP-equivalent 429).
    #[error("Rate limit exceeded for caller '{caller_id}'")]
    RateLimited {
        /// Caller identifier whose window is exhausted
        caller_id: String,
        /// Requests left in the window (always 0 on rejection)
        remaining: u32,
        /// Time until the oldest in-window request ages out
        retry_after: Duration,
    },

    /// The upstream provider failed after retries were exhausted
    /// (HTTP-equivalent 502). Never wraps a raw transport error directly.
    #[error("Provider error: {provider} [{code}] {message}")]
    Provider {
        /// Provider identifier (e.g. "YAHOO")
        provider: String,
        /// Machine-readable failure code
        code: ProviderErrorCode,
        /// Human-readable detail
        message: String,
    },

    /// Unexpected fault inside the orchestrator itself (HTTP-equivalent 500).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MarketDataError {
    /// Convenience constructor for provider errors.
    pub fn provider(
        provider: impl Into<String>,
        code: ProviderErrorCode,
        message: impl Into<String>,
    ) -> Self {
        Self::Provider {
            provider: provider.into(),
            code,
            message: message.into(),
        }
    }

    /// Returns the retry classification for this error.
    ///
    /// Only transient provider failures (timeouts and transport faults) are
    /// worth another attempt against the same provider; everything else is
    /// terminal for the current call.
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::Provider { code, .. } => match code {
                ProviderErrorCode::Timeout | ProviderErrorCode::FetchFailed => {
                    RetryClass::Transient
                }
                ProviderErrorCode::SymbolNotFound
                | ProviderErrorCode::ParseError
                | ProviderErrorCode::NotSupported => RetryClass::Terminal,
            },
            Self::Validation(_) | Self::RateLimited { .. } | Self::Internal(_) => {
                RetryClass::Terminal
            }
        }
    }

    /// HTTP status equivalent for this error, for the transport layer that
    /// wraps the engine.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::RateLimited { .. } => 429,
            Self::Provider { .. } => 502,
            Self::Internal(_) => 500,
        }
    }
}

impl From<reqwest::Error> for MarketDataError {
    fn from(error: reqwest::Error) -> Self {
        let code = if error.is_timeout() {
            ProviderErrorCode::Timeout
        } else if error.is_decode() {
            ProviderErrorCode::ParseError
        } else {
            ProviderErrorCode::FetchFailed
        };
        Self::provider("YAHOO", code, error.to_string())
    }
}
