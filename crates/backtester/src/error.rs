use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum BacktestError {
    #[error("Strategy execution error: {0}")]
    Strategy(#[from] strategies::StrategyError),

    #[error("Strategy produced {signals} signals for {closes} closes")]
    SignalLengthMismatch { signals: usize, closes: usize },

    #[error("Historical data for the requested range is incomplete or missing.")]
    DataUnavailable,
}
