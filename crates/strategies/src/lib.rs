//! # TrendLens Strategy Library
//!
//! Technical indicators and the signal rules built on them. It defines a
//! `Strategy` trait and the moving-average crossover implementation used by the
//! technicals and backtest views.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of data
//!   providers or presentation. It depends only on `core-types` and `configuration`.
//! - **Strategy Agnostic Backtests:** The `backtester` operates on any `Strategy`
//!   without knowing its internal details.

// Declare all the modules that constitute this crate.
pub mod error;
pub mod indicators;
pub mod ma_crossover;
// Re-export the key components to create a clean, public-facing API.
pub use error::StrategyError;
pub use indicators::moving_average;
pub use ma_crossover::{crossover_signal, MACrossover};

use core_types::Position;

/// The core trait that all signal rules implement.
///
/// `Send + Sync` lets a strategy be shared by the web server's request handlers.
pub trait Strategy: Send + Sync {
    /// A short human-readable description, e.g. "MA20/MA50 crossover".
    fn name(&self) -> String;

    /// Evaluates the rule over a full closing-price history.
    ///
    /// # Returns
    ///
    /// One entry per close: the position decided with information up to and
    /// including that close, or `None` while the rule is still warming up.
    fn signals(&self, closes: &[f64]) -> Result<Vec<Option<Position>>, StrategyError>;
}
