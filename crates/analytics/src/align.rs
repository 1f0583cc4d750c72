use crate::error::AnalyticsError;
use chrono::NaiveDate;
use core_types::{PriceSeries, PriceTable};
use std::collections::{BTreeMap, BTreeSet};

/// The aligned table plus the symbols that had to be left out of it.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    pub table: PriceTable,
    /// Symbols whose series was empty or held no finite price, in input order.
    pub excluded: Vec<String>,
}

/// Outer-joins the series on date and fills the gaps.
///
/// Fill policy: every column is reindexed onto the union of all dates, then
/// filled forward (a gap takes the last known price), then filled backward
/// (a leading gap takes the first known price). The resulting table is dense.
/// Column order follows input order.
pub fn align(series: &[PriceSeries]) -> Result<Alignment, AnalyticsError> {
    let (usable, excluded): (Vec<&PriceSeries>, Vec<&PriceSeries>) =
        series.iter().partition(|s| s.has_usable_values());
    let excluded: Vec<String> = excluded.iter().map(|s| s.symbol().to_string()).collect();

    if usable.is_empty() {
        return Err(AnalyticsError::NoUsableSeries);
    }

    let index: Vec<NaiveDate> = usable
        .iter()
        .flat_map(|s| s.points().iter().map(|p| p.date))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let columns = usable
        .iter()
        .map(|s| fill_column(s, &index))
        .collect::<Vec<_>>();
    let symbols = usable.iter().map(|s| s.symbol().to_string()).collect();

    tracing::debug!(
        rows = index.len(),
        columns = columns.len(),
        excluded = excluded.len(),
        "Aligned price series"
    );

    Ok(Alignment {
        table: PriceTable::new(index, symbols, columns)?,
        excluded,
    })
}

fn fill_column(series: &PriceSeries, index: &[NaiveDate]) -> Vec<f64> {
    let known: BTreeMap<NaiveDate, f64> = series
        .points()
        .iter()
        .filter(|p| p.close.is_finite())
        .map(|p| (p.date, p.close))
        .collect();

    // Forward fill.
    let mut last = None;
    let forward: Vec<Option<f64>> = index
        .iter()
        .map(|date| {
            if let Some(&price) = known.get(date) {
                last = Some(price);
            }
            last
        })
        .collect();

    // Backward fill covers only the leading gap; the series has at least one finite price.
    let first = forward.iter().flatten().next().copied().unwrap_or(f64::NAN);
    forward.into_iter().map(|v| v.unwrap_or(first)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::PricePoint;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn series(symbol: &str, points: &[(u32, f64)]) -> PriceSeries {
        PriceSeries::new(
            symbol,
            points
                .iter()
                .map(|&(d, c)| PricePoint::new(day(d), c))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn fills_forward_then_backward() {
        // Crypto trades every day; the equity misses the weekend and starts late.
        let btc = series("BTC-USD", &[(1, 100.0), (2, 101.0), (3, 102.0), (4, 103.0), (5, 104.0)]);
        let coin = series("COIN", &[(2, 50.0), (5, 55.0)]);

        let aligned = align(&[btc, coin]).unwrap();
        let table = aligned.table;

        assert_eq!(table.dates(), &[day(1), day(2), day(3), day(4), day(5)]);
        assert_eq!(table.symbols(), &["BTC-USD".to_string(), "COIN".to_string()]);
        assert_eq!(table.column("COIN").unwrap(), &[50.0, 50.0, 50.0, 50.0, 55.0]);
        assert!(aligned.excluded.is_empty());
    }

    #[test]
    fn missing_values_inside_a_series_are_filled() {
        let a = series("A", &[(1, 10.0), (2, f64::NAN), (3, 12.0)]);
        let table = align(&[a]).unwrap().table;
        assert_eq!(table.column("A").unwrap(), &[10.0, 10.0, 12.0]);
    }

    #[test]
    fn excludes_empty_and_all_missing_series() {
        let a = series("A", &[(1, 10.0), (2, 11.0)]);
        let empty = PriceSeries::empty("B");
        let missing = series("C", &[(1, f64::NAN)]);

        let aligned = align(&[a, empty, missing]).unwrap();
        assert_eq!(aligned.table.symbols(), &["A".to_string()]);
        assert_eq!(aligned.excluded, vec!["B".to_string(), "C".to_string()]);
        // Dates from an excluded series never enter the index.
        assert_eq!(aligned.table.row_count(), 2);
    }

    #[test]
    fn nothing_usable_is_an_error() {
        let result = align(&[PriceSeries::empty("A")]);
        assert_eq!(result, Err(AnalyticsError::NoUsableSeries));
        assert_eq!(align(&[]), Err(AnalyticsError::NoUsableSeries));
    }

    #[test]
    fn every_cell_is_finite_after_alignment() {
        let a = series("A", &[(3, 1.0), (9, 2.0)]);
        let b = series("B", &[(1, 5.0), (4, f64::NAN), (7, 6.0)]);
        let table = align(&[a, b]).unwrap().table;
        assert!(table.columns().iter().flatten().all(|v| v.is_finite()));
    }
}
