use crate::error::StrategyError;
use crate::indicators::moving_average;
use crate::Strategy;
use configuration::MACrossoverParams;
use core_types::{MovingAverage, Position};

/// The dual moving-average crossover rule.
///
/// Long while the fast MA is above the slow MA, flat otherwise.
#[derive(Debug, Clone)]
pub struct MACrossover {
    params: MACrossoverParams,
}

impl MACrossover {
    /// Creates a new `MACrossover` instance with the given parameters.
    ///
    /// It performs validation to ensure the parameters are logical.
    pub fn new(params: MACrossoverParams) -> Result<Self, StrategyError> {
        if params.ma_fast_period == 0 {
            return Err(StrategyError::InvalidParameters(
                "Fast MA period must be greater than zero".to_string(),
            ));
        }
        if params.ma_fast_period >= params.ma_slow_period {
            return Err(StrategyError::InvalidParameters(
                "Fast MA period must be less than Slow MA period".to_string(),
            ));
        }
        Ok(Self { params })
    }

    pub fn params(&self) -> MACrossoverParams {
        self.params
    }

    /// The fast and slow averages the signal is derived from.
    pub fn moving_averages(
        &self,
        closes: &[f64],
    ) -> Result<(MovingAverage, MovingAverage), StrategyError> {
        Ok((
            moving_average(closes, self.params.ma_fast_period)?,
            moving_average(closes, self.params.ma_slow_period)?,
        ))
    }
}

/// Derives the position for each date from a fast and a slow average.
///
/// `None` wherever either average is still undefined.
pub fn crossover_signal(fast: &MovingAverage, slow: &MovingAverage) -> Vec<Option<Position>> {
    fast.values
        .iter()
        .zip(&slow.values)
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) if f > s => Some(Position::Long),
            (Some(_), Some(_)) => Some(Position::Flat),
            _ => None,
        })
        .collect()
}

impl Strategy for MACrossover {
    fn name(&self) -> String {
        format!(
            "MA{}/MA{} crossover",
            self.params.ma_fast_period, self.params.ma_slow_period
        )
    }

    fn signals(&self, closes: &[f64]) -> Result<Vec<Option<Position>>, StrategyError> {
        let (fast, slow) = self.moving_averages(closes)?;
        let signals = crossover_signal(&fast, &slow);
        tracing::debug!(
            strategy = %self.name(),
            bars = closes.len(),
            long_days = signals.iter().filter(|s| **s == Some(Position::Long)).count(),
            "Evaluated crossover signals"
        );
        Ok(signals)
    }
}
