use core_types::{BacktestSeries, Position, PriceSeries};
use strategies::Strategy;

pub mod error;

pub use error::BacktestError;

/// Replays a strategy over one symbol's closing prices.
///
/// No transaction costs, slippage, position sizing or risk limits are modelled;
/// the result is a gross, fully-invested-or-flat return curve.
pub struct Backtester {
    strategy: Box<dyn Strategy>,
}

impl Backtester {
    pub fn new(strategy: Box<dyn Strategy>) -> Self {
        Self { strategy }
    }

    pub fn strategy_name(&self) -> String {
        self.strategy.name()
    }

    /// Runs the simulation for a single series.
    pub fn run(&self, series: &PriceSeries) -> Result<BacktestSeries, BacktestError> {
        if series.is_empty() {
            return Err(BacktestError::DataUnavailable);
        }

        let closes = series.closes();
        let signals = self.strategy.signals(&closes)?;
        if signals.len() != closes.len() {
            return Err(BacktestError::SignalLengthMismatch {
                signals: signals.len(),
                closes: closes.len(),
            });
        }

        let realized = realized_returns(&closes, &signals);
        let cumulative = cumulative_returns(&realized);
        let buy_and_hold = closes.iter().map(|c| c / closes[0]).collect();

        tracing::debug!(
            symbol = series.symbol(),
            strategy = %self.strategy.name(),
            final_value = cumulative.last().copied().unwrap_or(1.0),
            "Backtest complete"
        );

        Ok(BacktestSeries {
            symbol: series.symbol().to_string(),
            dates: series.dates(),
            signals,
            realized,
            cumulative,
            buy_and_hold,
        })
    }
}

/// The return realized at each date.
///
/// At date `t` the position decided at the close of `t - 1` is applied to the
/// move from `t` to `t + 1`: `signal[t-1] * (price[t+1] / price[t] - 1)`.
/// Whenever a term is undefined (first date, last date, warm-up signal, or a
/// non-finite price ratio) the realized return is 0.
pub fn realized_returns(closes: &[f64], signals: &[Option<Position>]) -> Vec<f64> {
    (0..closes.len())
        .map(|t| {
            let Some(Some(position)) = t.checked_sub(1).and_then(|prev| signals.get(prev)) else {
                return 0.0;
            };
            let Some(&next) = closes.get(t + 1) else {
                return 0.0;
            };
            let forward = next / closes[t] - 1.0;
            if forward.is_finite() {
                position.exposure() * forward
            } else {
                0.0
            }
        })
        .collect()
}

/// Running product of `1 + r`, starting from 1.0.
pub fn cumulative_returns(realized: &[f64]) -> Vec<f64> {
    realized
        .iter()
        .scan(1.0, |equity, r| {
            *equity *= 1.0 + r;
            Some(*equity)
        })
        .collect()
}
