//! Market-Data Aggregation Engine
//!
//! This crate aggregates equity market data behind a single async façade:
//! symbol normalization, a TTL cache, per-caller rate limiting, and a
//! provider client with bounded retry.
//!
//! # Overview
//!
//! The engine supports:
//! - Single and bulk quote retrieval with partial-failure accounting
//! - Historical series, fundamentals, search, and trending lists
//! - Ticker validation with suggestions for invalid input
//! - Per-caller sliding-window rate limiting
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |  InstrumentRequest|  (caller input)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! | MarketDataService|  (validate, admit, cache)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |  QuoteProvider   |  (Yahoo Finance)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |  InstrumentData  |  (snapshot + extras)
//! +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`MarketDataService`] - The aggregation façade
//! - [`InstrumentRequest`] / [`InstrumentData`] - Request and response units
//! - [`QuoteProvider`] - Upstream provider abstraction
//! - [`MarketDataError`] - Error taxonomy with retry classification

pub mod cache;
pub mod config;
pub mod errors;
pub mod limiter;
pub mod models;
pub mod provider;
pub mod service;
pub mod symbol;

// Re-export the public surface
pub use config::AggregatorConfig;
pub use errors::{MarketDataError, ProviderErrorCode, RetryClass};
pub use models::{
    BulkError, BulkErrorKind, BulkResult, Candidate, FundamentalData, HealthReport,
    HistoricalPoint, InstrumentData, InstrumentRequest, Interval, Period, ProbeStatus,
    QuoteSnapshot, ValidationResult,
};
pub use provider::{QuoteProvider, RetryPolicy, YahooProvider};
pub use service::MarketDataService;
pub use symbol::{classify_market, normalize, Market, NormalizedSymbol};
