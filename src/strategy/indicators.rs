//! Indicator helpers over closing prices

/// Exponential moving average of `values`, seeded with the simple average of
/// the first `period` values. `None` when there are fewer than `period`.
pub fn ema(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let seed = values[..period].iter().sum::<f64>() / period as f64;
    Some(
        values[period..]
            .iter()
            .fold(seed, |prev, v| v * k + prev * (1.0 - k)),
    )
}

/// Wilder's relative strength index. Needs `period + 1` values.
pub fn rsi(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() <= period {
        return None;
    }

    let changes: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
    let (first, rest) = changes.split_at(period);

    let mut avg_gain = first.iter().filter(|c| **c > 0.0).sum::<f64>() / period as f64;
    let mut avg_loss = -first.iter().filter(|c| **c < 0.0).sum::<f64>() / period as f64;

    let n = period as f64;
    for change in rest {
        avg_gain = (avg_gain * (n - 1.0) + change.max(0.0)) / n;
        avg_loss = (avg_loss * (n - 1.0) + (-change).max(0.0)) / n;
    }

    if avg_loss == 0.0 {
        return Some(if avg_gain == 0.0 { 50.0 } else { 100.0 });
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ema_constant_series() {
        let values = vec![2.0; 20];
        assert!((ema(&values, 5).unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_ema_lags_rising_series() {
        let values: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let fast = ema(&values, 5).unwrap();
        let slow = ema(&values, 13).unwrap();
        assert!(fast > slow);
        assert!(fast < 29.0);
    }

    #[test]
    fn test_ema_insufficient_data() {
        assert!(ema(&[1.0, 2.0], 5).is_none());
        assert!(ema(&[1.0], 0).is_none());
    }

    #[test]
    fn test_rsi_extremes() {
        let rising: Vec<f64> = (0..20).map(|i| i as f64).collect();
        assert_eq!(rsi(&rising, 14), Some(100.0));

        let falling: Vec<f64> = (0..20).map(|i| -(i as f64)).collect();
        assert_eq!(rsi(&falling, 14), Some(0.0));

        let flat = vec![1.0; 20];
        assert_eq!(rsi(&flat, 14), Some(50.0));
    }

    #[test]
    fn test_rsi_balanced_moves_near_fifty() {
        let zigzag: Vec<f64> = (0..40).map(|i| if i % 2 == 0 { 1.0 } else { 2.0 }).collect();
        let value = rsi(&zigzag, 14).unwrap();
        assert!((40.0..=60.0).contains(&value), "rsi was {value}");
    }

    #[test]
    fn test_rsi_insufficient_data() {
        assert!(rsi(&[1.0; 14], 14).is_none());
    }
}
