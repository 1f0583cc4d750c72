use crate::error::StrategyError;
use core_types::MovingAverage;
use ta::indicators::SimpleMovingAverage as Sma;
use ta::Next;

/// Trailing simple moving average over `window` observations.
///
/// The first `window - 1` positions are `None`: the `ta` indicator emits a
/// partial mean while warming up, and those values are discarded here.
pub fn moving_average(prices: &[f64], window: usize) -> Result<MovingAverage, StrategyError> {
    let mut sma = Sma::new(window).map_err(|e| {
        StrategyError::InvalidParameters(format!("moving average window {}: {:?}", window, e))
    })?;

    let values = prices
        .iter()
        .enumerate()
        .map(|(i, &price)| {
            let value = sma.next(price);
            (i + 1 >= window).then_some(value)
        })
        .collect();

    Ok(MovingAverage { window, values })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_until_the_window_fills() {
        let prices: Vec<f64> = (1..=10).map(|i| i as f64).collect();
        let ma = moving_average(&prices, 4).unwrap();

        assert_eq!(ma.values.len(), prices.len());
        assert!(ma.values[..3].iter().all(Option::is_none));
        for i in 3..prices.len() {
            let expected = prices[i - 3..=i].iter().sum::<f64>() / 4.0;
            assert!((ma.values[i].unwrap() - expected).abs() < 1e-9);
        }
        assert_eq!(ma.latest(), Some(8.5));
    }

    #[test]
    fn series_shorter_than_window_has_no_values() {
        let ma = moving_average(&[1.0, 2.0], 20).unwrap();
        assert_eq!(ma.values, vec![None, None]);
        assert_eq!(ma.latest(), None);
    }

    #[test]
    fn window_of_one_is_the_series() {
        let ma = moving_average(&[3.0, 5.0], 1).unwrap();
        assert_eq!(ma.values, vec![Some(3.0), Some(5.0)]);
    }

    #[test]
    fn zero_window_is_rejected() {
        assert!(matches!(
            moving_average(&[1.0], 0),
            Err(StrategyError::InvalidParameters(_))
        ));
    }
}
