use crate::enums::Position;
use crate::error::CoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A tradable asset and the human-readable name shown next to its symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    pub symbol: String,
    pub name: String,
}

impl Asset {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
        }
    }

    /// An asset with no display mapping; it is shown by its symbol.
    pub fn unnamed(symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        Self {
            name: symbol.clone(),
            symbol,
        }
    }
}

/// One daily closing price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// The daily closing prices of one symbol, in strictly increasing date order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Builds a series, rejecting out-of-order or duplicate dates.
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, CoreError> {
        let symbol = symbol.into();
        if let Some(pair) = points.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(CoreError::UnorderedSeries {
                symbol,
                date: pair[1].date,
            });
        }
        Ok(Self { symbol, points })
    }

    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            points: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// True when at least one close is a finite number.
    pub fn has_usable_values(&self) -> bool {
        self.points.iter().any(|p| p.close.is_finite())
    }
}

/// Closing prices of several symbols aligned on one shared, sorted date index.
///
/// Stored column-major: `columns[i]` holds the prices of `symbols[i]`, one per date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    symbols: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl PriceTable {
    pub fn new(
        dates: Vec<NaiveDate>,
        symbols: Vec<String>,
        columns: Vec<Vec<f64>>,
    ) -> Result<Self, CoreError> {
        check_shape(&dates, &symbols, &columns)?;
        Ok(Self {
            dates,
            symbols,
            columns,
        })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    pub fn column(&self, symbol: &str) -> Option<&[f64]> {
        self.symbols
            .iter()
            .position(|s| s == symbol)
            .map(|i| self.columns[i].as_slice())
    }

    pub fn row_count(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Day-over-day fractional returns; the row for `dates[k]` is the change into that day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnTable {
    dates: Vec<NaiveDate>,
    symbols: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl ReturnTable {
    pub fn new(
        dates: Vec<NaiveDate>,
        symbols: Vec<String>,
        columns: Vec<Vec<f64>>,
    ) -> Result<Self, CoreError> {
        check_shape(&dates, &symbols, &columns)?;
        Ok(Self {
            dates,
            symbols,
            columns,
        })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    pub fn column(&self, symbol: &str) -> Option<&[f64]> {
        self.symbols
            .iter()
            .position(|s| s == symbol)
            .map(|i| self.columns[i].as_slice())
    }

    pub fn row_count(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

fn check_shape(
    dates: &[NaiveDate],
    symbols: &[String],
    columns: &[Vec<f64>],
) -> Result<(), CoreError> {
    if symbols.len() != columns.len() {
        return Err(CoreError::ShapeMismatch(format!(
            "{} symbols but {} columns",
            symbols.len(),
            columns.len()
        )));
    }
    if let Some((symbol, column)) = symbols
        .iter()
        .zip(columns)
        .find(|(_, c)| c.len() != dates.len())
    {
        return Err(CoreError::ShapeMismatch(format!(
            "column '{}' has {} values for {} dates",
            symbol,
            column.len(),
            dates.len()
        )));
    }
    Ok(())
}

/// A symmetric symbol-by-symbol table of Pearson coefficients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    symbols: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn new(symbols: Vec<String>, values: Vec<Vec<f64>>) -> Result<Self, CoreError> {
        let n = symbols.len();
        if values.len() != n || values.iter().any(|row| row.len() != n) {
            return Err(CoreError::ShapeMismatch(format!(
                "correlation matrix for {} symbols must be {}x{}",
                n, n, n
            )));
        }
        Ok(Self { symbols, values })
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }

    pub fn size(&self) -> usize {
        self.symbols.len()
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.symbols.iter().position(|s| s == a)?;
        let j = self.symbols.iter().position(|s| s == b)?;
        Some(self.values[i][j])
    }

    /// A copy rounded for display. NaN entries stay NaN.
    pub fn rounded(&self, decimals: u32) -> Self {
        let scale = 10f64.powi(decimals as i32);
        Self {
            symbols: self.symbols.clone(),
            values: self
                .values
                .iter()
                .map(|row| row.iter().map(|v| (v * scale).round() / scale).collect())
                .collect(),
        }
    }
}

/// A trailing simple moving average; `None` until the window has filled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovingAverage {
    pub window: usize,
    pub values: Vec<Option<f64>>,
}

impl MovingAverage {
    /// The most recent defined value, if any.
    pub fn latest(&self) -> Option<f64> {
        self.values.last().copied().flatten()
    }
}

/// The outcome of replaying the crossover rule over one symbol's history.
///
/// All vectors are indexed like `dates`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestSeries {
    pub symbol: String,
    pub dates: Vec<NaiveDate>,
    /// Position decided with information available at the close of each date.
    pub signals: Vec<Option<Position>>,
    /// Return realized at each date, zero where it is undefined.
    pub realized: Vec<f64>,
    /// Running product of `1 + realized`, starting from 1.0.
    pub cumulative: Vec<f64>,
    /// Price relative to the first close, for comparison.
    pub buy_and_hold: Vec<f64>,
}

impl BacktestSeries {
    /// Final strategy return as a fraction (0.25 = +25%).
    pub fn total_return(&self) -> Option<f64> {
        self.cumulative.last().map(|c| c - 1.0)
    }

    pub fn buy_and_hold_return(&self) -> Option<f64> {
        self.buy_and_hold.last().map(|c| c - 1.0)
    }
}
