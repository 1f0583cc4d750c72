use crate::error::ApiError;
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::PriceSeries;

pub mod error;
pub mod fixture;
pub mod responses;
pub mod yahoo;
// --- Public API ---
pub use fixture::FixtureSource;
pub use yahoo::YahooClient;

/// The result of asking a data source for one symbol's history.
///
/// Providers fail in many ways; callers only need to tell these three apart.
#[derive(Debug)]
pub enum FetchOutcome {
    /// At least one closing price was returned.
    Series(PriceSeries),
    /// The provider answered but had nothing for the symbol and range.
    Empty,
    /// The request itself failed (network, unknown symbol, rate limit, bad payload).
    Fault(ApiError),
}

/// The generic, abstract interface for a market-data provider.
/// The pipeline depends only on this trait, so a live provider and a
/// frozen fixture can be swapped freely.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetches daily closing prices for `symbol` from `start` to `end`, inclusive.
    ///
    /// Implementations never return an error; failures are reported as `FetchOutcome::Fault`.
    async fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> FetchOutcome;
}
