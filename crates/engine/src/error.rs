use thiserror::Error;

/// Why the pipeline had nothing at all to show.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NoDataCause {
    #[error("no symbols were selected")]
    NothingSelected,

    #[error("none of the selected symbols returned usable prices: {}", .0.join(", "))]
    AllSymbolsUnusable(Vec<String>),
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("No data available: {0}")]
    NoDataAvailable(NoDataCause),

    #[error("Analytics error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),

    #[error("Strategy error: {0}")]
    Strategy(#[from] strategies::StrategyError),

    #[error("Backtest error: {0}")]
    Backtest(#[from] backtester::BacktestError),
}
