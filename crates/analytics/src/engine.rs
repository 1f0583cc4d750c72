use crate::error::AnalyticsError;
use core_types::{CorrelationMatrix, PriceTable, ReturnTable};

/// A stateless calculator for the trend and correlation views.
#[derive(Debug, Default)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rescales a price sequence so that it starts at 1.0.
    ///
    /// # Errors
    ///
    /// `NotEnoughData` for an empty input, `InvalidBaseline` when the first value
    /// is zero or not finite. Both are expected conditions for the caller to report.
    pub fn normalize(&self, prices: &[f64]) -> Result<Vec<f64>, AnalyticsError> {
        let first = *prices
            .first()
            .ok_or_else(|| AnalyticsError::NotEnoughData("cannot normalize an empty series".to_string()))?;
        if first == 0.0 || !first.is_finite() {
            return Err(AnalyticsError::InvalidBaseline(first));
        }
        Ok(prices.iter().map(|p| p / first).collect())
    }

    /// Computes day-over-day fractional returns for every column.
    ///
    /// The first row never has a return and is dropped. A later row is dropped as
    /// well when the change of *any* column is not computable, so every column of
    /// the result covers the same dates.
    pub fn returns(&self, table: &PriceTable) -> Result<ReturnTable, AnalyticsError> {
        let columns = table.columns();
        let mut dates = Vec::with_capacity(table.row_count().saturating_sub(1));
        let mut out: Vec<Vec<f64>> = vec![Vec::with_capacity(dates.capacity()); columns.len()];

        for t in 1..table.row_count() {
            let row: Vec<f64> = columns
                .iter()
                .map(|c| (c[t] - c[t - 1]) / c[t - 1])
                .collect();
            if row.iter().all(|r| r.is_finite()) {
                dates.push(table.dates()[t]);
                for (column, r) in out.iter_mut().zip(row) {
                    column.push(r);
                }
            }
        }

        let dropped = table.row_count().saturating_sub(1) - dates.len();
        if dropped > 0 {
            tracing::debug!(dropped, "Dropped return rows with an undefined change");
        }
        Ok(ReturnTable::new(dates, table.symbols().to_vec(), out)?)
    }

    /// Pairwise Pearson correlation of the return columns.
    ///
    /// # Errors
    ///
    /// `NotEnoughData` when fewer than two return rows exist; the sample
    /// correlation is undefined below that.
    pub fn correlate(&self, returns: &ReturnTable) -> Result<CorrelationMatrix, AnalyticsError> {
        if returns.row_count() < 2 {
            return Err(AnalyticsError::NotEnoughData(format!(
                "{} aligned return rows, at least 2 are required",
                returns.row_count()
            )));
        }

        let columns = returns.columns();
        let n = columns.len();
        let mut values = vec![vec![f64::NAN; n]; n];
        for i in 0..n {
            for j in i..n {
                let r = if i == j {
                    if is_constant(&columns[i]) { f64::NAN } else { 1.0 }
                } else {
                    pearson(&columns[i], &columns[j])
                };
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        Ok(CorrelationMatrix::new(returns.symbols().to_vec(), values)?)
    }
}

/// Sample Pearson correlation of two equally long sequences.
///
/// Returns NaN when either input is constant or shorter than two values.
/// The N−1 factors of the sample covariance and variances cancel out.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 || is_constant(&x[..n]) || is_constant(&y[..n]) {
        return f64::NAN;
    }

    let mean_x = x[..n].iter().sum::<f64>() / n as f64;
    let mean_y = y[..n].iter().sum::<f64>() / n as f64;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x[..n].iter().zip(&y[..n]) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0)
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const EPS: f64 = 1e-12;

    fn table(columns: &[(&str, Vec<f64>)]) -> PriceTable {
        let rows = columns[0].1.len();
        let dates = (0..rows)
            .map(|i| NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(i as u64))
            .collect();
        PriceTable::new(
            dates,
            columns.iter().map(|(s, _)| s.to_string()).collect(),
            columns.iter().map(|(_, c)| c.clone()).collect(),
        )
        .unwrap()
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < EPS, "{} != {}", a, b);
    }

    #[test]
    fn normalized_series_starts_at_one() {
        let engine = AnalyticsEngine::new();
        assert_eq!(
            engine.normalize(&[10.0, 20.0, 30.0, 40.0]).unwrap(),
            vec![1.0, 2.0, 3.0, 4.0]
        );
        assert_eq!(engine.normalize(&[0.37]).unwrap()[0], 1.0);
    }

    #[test]
    fn normalizing_nothing_is_reported_not_a_panic() {
        let engine = AnalyticsEngine::new();
        assert!(matches!(
            engine.normalize(&[]),
            Err(AnalyticsError::NotEnoughData(_))
        ));
        assert_eq!(
            engine.normalize(&[0.0, 1.0]),
            Err(AnalyticsError::InvalidBaseline(0.0))
        );
    }

    #[test]
    fn returns_drop_exactly_the_first_row() {
        let engine = AnalyticsEngine::new();
        let prices = table(&[("A", vec![10.0, 20.0, 30.0, 40.0]), ("B", vec![100.0, 90.0, 80.0, 70.0])]);
        let returns = engine.returns(&prices).unwrap();

        assert_eq!(returns.row_count(), prices.row_count() - 1);
        assert_eq!(returns.dates(), &prices.dates()[1..]);
        let a = returns.column("A").unwrap();
        assert_close(a[0], 1.0);
        assert_close(a[1], 0.5);
        assert_close(a[2], 1.0 / 3.0);
    }

    #[test]
    fn any_column_with_undefined_change_drops_the_row() {
        let engine = AnalyticsEngine::new();
        // A zero price makes the following change undefined for column B only.
        let prices = table(&[("A", vec![1.0, 2.0, 3.0, 4.0]), ("B", vec![1.0, 0.0, 2.0, 3.0])]);
        let returns = engine.returns(&prices).unwrap();

        assert_eq!(returns.row_count(), 2);
        assert_eq!(returns.column("A").unwrap().len(), returns.column("B").unwrap().len());
    }

    #[test]
    fn opposite_linear_prices_correlate_perfectly_negative_in_levels() {
        assert_close(pearson(&[10.0, 20.0, 30.0, 40.0], &[100.0, 90.0, 80.0, 70.0]), -1.0);
    }

    #[test]
    fn return_correlation_of_the_linear_scenario() {
        // Both return series shrink in magnitude over time, so their returns co-move.
        let engine = AnalyticsEngine::new();
        let prices = table(&[("A", vec![10.0, 20.0, 30.0, 40.0]), ("B", vec![100.0, 90.0, 80.0, 70.0])]);
        let matrix = engine.correlate(&engine.returns(&prices).unwrap()).unwrap();
        assert!((matrix.get("A", "B").unwrap() - 0.941_042_592_1).abs() < 1e-9);
    }

    #[test]
    fn correlation_matrix_is_symmetric_with_unit_diagonal() {
        let engine = AnalyticsEngine::new();
        let prices = table(&[
            ("BTC-USD", vec![100.0, 104.0, 101.0, 108.0, 107.0, 111.0]),
            ("COIN", vec![50.0, 53.0, 50.5, 56.0, 55.0, 58.5]),
            ("MSTR", vec![300.0, 290.0, 310.0, 305.0, 320.0, 318.0]),
        ]);
        let matrix = engine.correlate(&engine.returns(&prices).unwrap()).unwrap();

        for i in 0..matrix.size() {
            assert_close(matrix.values()[i][i], 1.0);
            for j in 0..matrix.size() {
                let v = matrix.values()[i][j];
                assert_eq!(v, matrix.values()[j][i]);
                assert!((-1.0..=1.0).contains(&v));
            }
        }
    }

    #[test]
    fn constant_column_correlates_as_nan() {
        let engine = AnalyticsEngine::new();
        let prices = table(&[("A", vec![1.0, 2.0, 4.0, 5.0]), ("STABLE", vec![1.0, 1.0, 1.0, 1.0])]);
        let matrix = engine.correlate(&engine.returns(&prices).unwrap()).unwrap();

        assert!(matrix.get("A", "STABLE").unwrap().is_nan());
        assert!(matrix.get("STABLE", "STABLE").unwrap().is_nan());
        assert_eq!(matrix.get("A", "A"), Some(1.0));
    }

    #[test]
    fn too_few_return_rows_are_insufficient() {
        let engine = AnalyticsEngine::new();
        let one_day = table(&[("A", vec![1.0]), ("B", vec![2.0])]);
        let returns = engine.returns(&one_day).unwrap();
        assert!(returns.is_empty());
        assert!(matches!(
            engine.correlate(&returns),
            Err(AnalyticsError::NotEnoughData(_))
        ));
    }
}
