//! Provider abstraction and the Yahoo Finance implementation.

mod retry;
mod traits;
pub mod yahoo;

pub use retry::RetryPolicy;
pub use traits::QuoteProvider;
pub use yahoo::YahooProvider;
