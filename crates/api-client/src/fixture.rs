use crate::error::ApiError;
use crate::{DataSource, FetchOutcome};
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::{PricePoint, PriceSeries};
use std::collections::BTreeMap;
use std::path::Path;

/// A `DataSource` that replays frozen closing prices instead of calling a provider.
///
/// The file format is a JSON object keyed by symbol:
/// `{"BTC-USD": [{"date": "2024-01-02", "close": 45000.0}, ...]}`.
/// Symbols missing from the fixture come back as `FetchOutcome::Empty`.
#[derive(Debug, Clone, Default)]
pub struct FixtureSource {
    prices: BTreeMap<String, Vec<PricePoint>>,
}

impl FixtureSource {
    pub fn new(prices: BTreeMap<String, Vec<PricePoint>>) -> Self {
        Self { prices }
    }

    pub fn from_file(path: &Path) -> Result<Self, ApiError> {
        let text = std::fs::read_to_string(path)?;
        let prices: BTreeMap<String, Vec<PricePoint>> =
            serde_json::from_str(&text).map_err(|e| ApiError::Deserialization(e.to_string()))?;
        tracing::info!(
            symbols = prices.len(),
            "Loaded price fixture from {}",
            path.display()
        );
        Ok(Self { prices })
    }

    /// The last date present in any replayed series, used as the run's "today".
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.prices
            .values()
            .filter_map(|points| points.iter().map(|p| p.date).max())
            .max()
    }
}

#[async_trait]
impl DataSource for FixtureSource {
    async fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> FetchOutcome {
        let Some(points) = self.prices.get(symbol) else {
            return FetchOutcome::Empty;
        };

        let mut window: Vec<PricePoint> = points
            .iter()
            .filter(|p| p.date >= start && p.date <= end)
            .copied()
            .collect();
        window.sort_by_key(|p| p.date);

        if window.is_empty() {
            return FetchOutcome::Empty;
        }
        match PriceSeries::new(symbol, window) {
            Ok(series) => FetchOutcome::Series(series),
            Err(e) => FetchOutcome::Fault(ApiError::InvalidData(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn source() -> FixtureSource {
        let mut prices = BTreeMap::new();
        prices.insert(
            "SPY".to_string(),
            vec![
                PricePoint::new(day(4), 510.0),
                PricePoint::new(day(1), 505.0),
                PricePoint::new(day(5), 512.0),
            ],
        );
        prices.insert(
            "DUP".to_string(),
            vec![PricePoint::new(day(1), 1.0), PricePoint::new(day(1), 2.0)],
        );
        FixtureSource::new(prices)
    }

    #[tokio::test]
    async fn replays_sorted_window() {
        let outcome = source().fetch("SPY", day(2), day(5)).await;
        let FetchOutcome::Series(series) = outcome else {
            panic!("expected a series, got {:?}", outcome);
        };
        assert_eq!(series.dates(), vec![day(4), day(5)]);
        assert_eq!(series.closes(), vec![510.0, 512.0]);
    }

    #[tokio::test]
    async fn unknown_symbol_and_empty_window_are_empty() {
        let source = source();
        assert!(matches!(
            source.fetch("QQQ", day(1), day(5)).await,
            FetchOutcome::Empty
        ));
        assert!(matches!(
            source.fetch("SPY", day(20), day(25)).await,
            FetchOutcome::Empty
        ));
    }

    #[tokio::test]
    async fn duplicate_dates_are_a_fault() {
        assert!(matches!(
            source().fetch("DUP", day(1), day(5)).await,
            FetchOutcome::Fault(ApiError::InvalidData(_))
        ));
    }

    #[test]
    fn latest_date_spans_all_symbols() {
        assert_eq!(source().latest_date(), Some(day(5)));
    }
}
