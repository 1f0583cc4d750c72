use chrono::NaiveDate;
use configuration::TimeRange;
use core_types::{
    Asset, BacktestSeries, CorrelationMatrix, MovingAverage, Position, PriceTable, ReturnTable,
};
use serde::Serialize;

/// Decimal places the correlation matrix is presented with.
pub const CORRELATION_DISPLAY_DECIMALS: u32 = 3;

/// What one dashboard refresh is asked to compute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub assets: Vec<Asset>,
    pub range: TimeRange,
    /// The last calendar day of the window, inclusive.
    pub as_of: NaiveDate,
}

impl RunRequest {
    pub fn new(assets: Vec<Asset>, range: TimeRange, as_of: NaiveDate) -> Self {
        Self { assets, range, as_of }
    }

    /// First calendar day of the window: `as_of` minus the range's day count.
    pub fn start(&self) -> NaiveDate {
        self.as_of - chrono::Days::new(u64::from(self.range.days()))
    }
}

/// Why a selected symbol contributed nothing to the aligned table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum UnavailableReason {
    /// The provider returned no rows for the window.
    Empty,
    /// Rows came back but none held a finite closing price.
    NoUsablePrices,
    /// The request itself failed.
    ProviderFault(String),
}

impl std::fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnavailableReason::Empty => write!(f, "no rows in the selected range"),
            UnavailableReason::NoUsablePrices => write!(f, "no finite closing prices"),
            UnavailableReason::ProviderFault(detail) => write!(f, "{}", detail),
        }
    }
}

/// A recoverable condition; the snapshot is still produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineWarning {
    /// A symbol was dropped and the dashboard continues with the rest.
    PartialDataUnavailable {
        symbol: String,
        reason: UnavailableReason,
    },
    /// Fewer than two aligned return rows, so there is no correlation.
    /// Backtests are skipped only when there are no return rows at all.
    InsufficientAlignedData { return_rows: usize },
    /// The first aligned price is zero or not finite, so there is no trend line.
    NormalizationUnavailable { symbol: String, detail: String },
}

/// The correlation view, or the reason there is none.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CorrelationView {
    Matrix {
        /// Full-precision coefficients.
        matrix: CorrelationMatrix,
        /// The same values rounded for display.
        display: CorrelationMatrix,
    },
    /// Only one symbol survived alignment.
    SingleAsset { symbol: String },
    InsufficientData { return_rows: usize },
}

/// One symbol's trend line, indexed like the aligned table's dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedSeries {
    pub symbol: String,
    pub values: Vec<f64>,
}

/// Moving averages and the current signal for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnicalView {
    pub symbol: String,
    pub dates: Vec<NaiveDate>,
    pub closes: Vec<f64>,
    pub ma_fast: MovingAverage,
    pub ma_slow: MovingAverage,
    /// Signal at the most recent close, `None` while the slow average warms up.
    pub latest_signal: Option<Position>,
}

impl TechnicalView {
    pub fn latest_close(&self) -> Option<f64> {
        self.closes.last().copied()
    }
}

/// Everything the dashboard views render for one refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub as_of: NaiveDate,
    pub start: NaiveDate,
    pub range: TimeRange,
    /// Symbols present in the aligned table, in selection order.
    pub assets: Vec<Asset>,
    pub warnings: Vec<PipelineWarning>,
    pub prices: PriceTable,
    pub returns: ReturnTable,
    pub normalized: Vec<NormalizedSeries>,
    pub correlation: CorrelationView,
    pub technicals: Vec<TechnicalView>,
    pub strategy: String,
    pub backtests: Vec<BacktestSeries>,
}

impl Snapshot {
    pub fn technicals_for(&self, symbol: &str) -> Option<&TechnicalView> {
        self.technicals.iter().find(|t| t.symbol == symbol)
    }

    pub fn backtest_for(&self, symbol: &str) -> Option<&BacktestSeries> {
        self.backtests.iter().find(|b| b.symbol == symbol)
    }
}
