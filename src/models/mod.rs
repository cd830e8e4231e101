//! Request and response data model for the aggregation engine.

mod bulk;
mod fundamentals;
mod health;
mod quote;
mod request;
mod search;
mod validation;

pub use bulk::{BulkError, BulkErrorKind, BulkResult};
pub use fundamentals::FundamentalData;
pub use health::{HealthReport, ProbeStatus};
pub use quote::{HistoricalPoint, InstrumentData, QuoteSnapshot};
pub use request::{Interval, InstrumentRequest, Period, RequestedRange};
pub use search::Candidate;
pub use validation::ValidationResult;
