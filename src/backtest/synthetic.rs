use crate::models::Candle;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Shape of the generated market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
pub enum MarketScenario {
    /// Steady uptrend with noise (+1% daily average)
    Uptrend,
    /// Steady downtrend with noise (-1% daily average)
    Downtrend,
    /// Mean-reverting chop around the start price
    Sideways,
    /// Large random swings
    Volatile,
    /// Slow climb, sharp crash, then recovery
    CrashRecovery,
}

/// Generates synthetic hourly price data for replaying the controller
pub struct SyntheticDataGenerator {
    rng: StdRng,
    base_price: f64,
    base_volume: f64,
    start_time: DateTime<Utc>,
}

impl SyntheticDataGenerator {
    /// Same seed, same series
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            base_price: 600.0,
            base_volume: 50_000.0,
            start_time: DateTime::from_timestamp(1_704_067_200, 0).unwrap_or_default(), // 2024-01-01
        }
    }

    /// `num_candles` bars spaced `interval_minutes` apart, following `scenario`
    pub fn generate(
        &mut self,
        scenario: MarketScenario,
        num_candles: usize,
        interval_minutes: i64,
    ) -> Vec<Candle> {
        let intervals_per_day = (24 * 60 / interval_minutes.max(1)) as f64;
        let mut candles = Vec::with_capacity(num_candles);
        let mut price = self.base_price;

        for i in 0..num_candles {
            let timestamp = self.start_time + Duration::minutes(i as i64 * interval_minutes);
            let progress = i as f64 / num_candles.max(1) as f64;

            let change = match scenario {
                MarketScenario::Uptrend => {
                    price * (0.01 / intervals_per_day + self.rng.gen_range(-0.004..0.004))
                }
                MarketScenario::Downtrend => {
                    price * (-0.01 / intervals_per_day + self.rng.gen_range(-0.004..0.004))
                }
                MarketScenario::Sideways => {
                    // 2% pull to mean + noise
                    (self.base_price - price) * 0.02 + price * self.rng.gen_range(-0.006..0.006)
                }
                MarketScenario::Volatile => price * self.rng.gen_range(-0.015..0.015),
                MarketScenario::CrashRecovery => {
                    let drift = if progress < 0.6 {
                        0.004 / intervals_per_day
                    } else if progress < 0.7 {
                        -0.40 / (0.1 * num_candles as f64)
                    } else {
                        0.015 / intervals_per_day
                    };
                    price * (drift + self.rng.gen_range(-0.003..0.003))
                }
            };

            // Keep price from collapsing to zero
            price = (price + change).max(self.base_price * 0.05);

            let candle = self.bar_around(price, timestamp);
            candles.push(candle);
        }

        candles
    }

    /// Bar closing at `price` with a small random intrabar range
    fn bar_around(&mut self, price: f64, timestamp: DateTime<Utc>) -> Candle {
        let noise_pct = 0.002; // ±0.2% intrabar movement

        let high = price * (1.0 + self.rng.gen_range(0.0..noise_pct));
        let low = price * (1.0 - self.rng.gen_range(0.0..noise_pct));

        let open_raw = price * (1.0 + self.rng.gen_range(-noise_pct..noise_pct));
        let open = open_raw.clamp(low, high);

        let volume = self.base_volume * self.rng.gen_range(0.7..1.3);

        Candle {
            timestamp,
            open,
            high,
            low,
            close: price,
            volume,
        }
    }
}

/// Fold consecutive candles into one: first open, max high, min low, last close
pub fn merge_candles(candles: &[Candle]) -> Option<Candle> {
    let first = candles.first()?;
    let last = candles.last()?;

    Some(Candle {
        timestamp: first.timestamp,
        open: first.open,
        high: candles.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max),
        low: candles.iter().map(|c| c.low).fold(f64::INFINITY, f64::min),
        close: last.close,
        volume: candles.iter().map(|c| c.volume).sum(),
    })
}

/// Aggregate hourly candles into daily candles (24 per day, trailing partial day dropped)
pub fn aggregate_daily(hourly: &[Candle]) -> Vec<Candle> {
    hourly.chunks_exact(24).filter_map(merge_candles).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_uptrend() {
        let mut gen = SyntheticDataGenerator::new(42);
        let candles = gen.generate(MarketScenario::Uptrend, 24 * 200, 60);

        assert_eq!(candles.len(), 24 * 200);

        let first_price = candles.first().unwrap().close;
        let last_price = candles.last().unwrap().close;
        assert!(
            last_price > first_price,
            "Uptrend should end higher: {} -> {}",
            first_price,
            last_price
        );
    }

    #[test]
    fn test_generate_downtrend() {
        let mut gen = SyntheticDataGenerator::new(42);
        let candles = gen.generate(MarketScenario::Downtrend, 24 * 200, 60);

        let first_price = candles.first().unwrap().close;
        let last_price = candles.last().unwrap().close;
        assert!(
            last_price < first_price,
            "Downtrend should end lower: {} -> {}",
            first_price,
            last_price
        );
    }

    #[test]
    fn test_generate_sideways() {
        let mut gen = SyntheticDataGenerator::new(42);
        let candles = gen.generate(MarketScenario::Sideways, 2000, 60);

        let base = gen.base_price;
        for candle in &candles {
            assert!(
                candle.close > base * 0.8 && candle.close < base * 1.2,
                "Sideways should stay near base: {} vs {}",
                candle.close,
                base
            );
        }
    }

    #[test]
    fn test_same_seed_same_series() {
        let a = SyntheticDataGenerator::new(7).generate(MarketScenario::Volatile, 100, 60);
        let b = SyntheticDataGenerator::new(7).generate(MarketScenario::Volatile, 100, 60);
        assert_eq!(a, b);
    }

    #[test]
    fn test_ohlc_consistency() {
        let mut gen = SyntheticDataGenerator::new(42);
        let candles = gen.generate(MarketScenario::CrashRecovery, 500, 60);

        for candle in &candles {
            assert!(candle.high >= candle.close, "High should be >= close");
            assert!(candle.high >= candle.open, "High should be >= open");
            assert!(candle.low <= candle.close, "Low should be <= close");
            assert!(candle.low <= candle.open, "Low should be <= open");
        }
    }

    #[test]
    fn test_aggregate_daily() {
        let mut gen = SyntheticDataGenerator::new(1);
        let hourly = gen.generate(MarketScenario::Sideways, 24 * 3 + 5, 60);
        let daily = aggregate_daily(&hourly);

        assert_eq!(daily.len(), 3);
        let day = &daily[1];
        let hours = &hourly[24..48];
        assert_eq!(day.timestamp, hours[0].timestamp);
        assert_eq!(day.open, hours[0].open);
        assert_eq!(day.close, hours[23].close);
        assert!(hours.iter().all(|h| h.high <= day.high && h.low >= day.low));
    }

    #[test]
    fn test_merge_empty() {
        assert!(merge_candles(&[]).is_none());
    }
}
