use super::moving_average::calculate_ema_series;

/// MACD line and signal line at the most recent price
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Macd {
    pub macd_line: f64,
    pub signal_line: f64,
}

impl Macd {
    pub fn histogram(&self) -> f64 {
        self.macd_line - self.signal_line
    }
}

/// Calculate MACD (fast EMA - slow EMA) and its signal EMA
///
/// Needs at least `slow + signal - 1` prices.
pub fn calculate_macd(prices: &[f64], fast: usize, slow: usize, signal: usize) -> Option<Macd> {
    if fast == 0 || fast >= slow {
        return None;
    }

    let fast_series = calculate_ema_series(prices, fast)?;
    let slow_series = calculate_ema_series(prices, slow)?;

    // Align both series on the slow EMA's first value
    let offset = slow - fast;
    let macd_series: Vec<f64> = slow_series
        .iter()
        .zip(&fast_series[offset..])
        .map(|(slow_ema, fast_ema)| fast_ema - slow_ema)
        .collect();

    let signal_series = calculate_ema_series(&macd_series, signal)?;

    Some(Macd {
        macd_line: *macd_series.last()?,
        signal_line: *signal_series.last()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macd_insufficient_data() {
        let prices = vec![100.0; 30];
        assert!(calculate_macd(&prices, 12, 26, 9).is_none());
    }

    #[test]
    fn test_macd_flat_market() {
        let prices = vec![100.0; 60];
        let macd = calculate_macd(&prices, 12, 26, 9).unwrap();
        assert!(macd.macd_line.abs() < 1e-9);
        assert!(macd.histogram().abs() < 1e-9);
    }

    #[test]
    fn test_macd_accelerating_uptrend_is_positive() {
        let prices: Vec<f64> = (0..80).map(|i| 100.0 + (i as f64).powi(2) * 0.05).collect();
        let macd = calculate_macd(&prices, 12, 26, 9).unwrap();
        assert!(macd.macd_line > 0.0);
        assert!(macd.histogram() > 0.0);
    }

    #[test]
    fn test_macd_rejects_inverted_periods() {
        let prices = vec![100.0; 80];
        assert!(calculate_macd(&prices, 26, 12, 9).is_none());
    }
}
