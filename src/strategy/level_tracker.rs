use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::config::S1Config;
use crate::error::ControllerError;
use crate::host::MarketDataFeed;
use crate::models::Candle;

/// Rolling high/low reference band over completed daily candles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandState {
    pub high: f64,
    pub low: f64,
    pub last_update: DateTime<Utc>,
}

/// Compute (high, low) over the `lookback` candles ending at the second-to-last one
///
/// The last candle is today's, still forming, and never part of the band.
pub fn compute_band(candles: &[Candle], lookback: usize) -> Result<(f64, f64), ControllerError> {
    let needed = lookback + 1;
    if lookback == 0 || candles.len() < needed {
        return Err(ControllerError::InsufficientCandles {
            got: candles.len(),
            needed,
        });
    }

    let end = candles.len() - 1;
    let start = end - lookback;
    let window = &candles[start..end];

    let mut high = f64::NEG_INFINITY;
    let mut low = f64::INFINITY;

    for (offset, candle) in window.iter().enumerate() {
        if !candle.high.is_finite() || !candle.low.is_finite() {
            return Err(ControllerError::InvalidCandle {
                index: start + offset,
                reason: "non-finite high/low".to_string(),
            });
        }
        if candle.high < candle.low {
            return Err(ControllerError::InvalidCandle {
                index: start + offset,
                reason: format!("high {} below low {}", candle.high, candle.low),
            });
        }
        high = high.max(candle.high);
        low = low.min(candle.low);
    }

    Ok((high, low))
}

/// Keeps the reference band fresh, roughly once per day
pub struct LevelTracker {
    feed: Arc<dyn MarketDataFeed>,
    symbol: String,
    lookback: usize,
    fetch_count: usize,
    refresh_interval: Duration,
    band: Option<BandState>,
}

impl LevelTracker {
    pub fn new(feed: Arc<dyn MarketDataFeed>, config: &S1Config) -> Self {
        Self {
            feed,
            symbol: config.symbol.clone(),
            lookback: config.lookback_days,
            fetch_count: config.daily_fetch_count(),
            // Out-of-range intervals fall back to daily; `validate` refuses them first
            refresh_interval: Duration::try_seconds(config.refresh_interval_secs)
                .unwrap_or_else(|| Duration::days(1)),
            band: None,
        }
    }

    /// Current band, `None` until the first successful refresh
    pub fn band(&self) -> Option<&BandState> {
        self.band.as_ref()
    }

    pub fn should_refresh(&self, now: DateTime<Utc>) -> bool {
        match &self.band {
            Some(band) => now - band.last_update >= self.refresh_interval,
            None => true,
        }
    }

    /// Fetch daily candles and rebuild the band
    ///
    /// Returns `true` if the band was replaced. On any failure the previous band
    /// stays in place.
    pub async fn refresh(&mut self, now: DateTime<Utc>) -> bool {
        match self.fetch_band(now).await {
            Ok(band) => {
                tracing::info!(
                    symbol = %self.symbol,
                    "S1 levels updated: high={:.4}, low={:.4}",
                    band.high,
                    band.low
                );
                self.band = Some(band);
                true
            }
            Err(ControllerError::InsufficientCandles { got, needed }) => {
                tracing::warn!(
                    "S1: insufficient daily candles received ({}), need {}; levels not updated",
                    got,
                    needed
                );
                false
            }
            Err(e) => {
                tracing::error!("S1: failed to fetch or calculate daily levels: {}", e);
                false
            }
        }
    }

    async fn fetch_band(&self, now: DateTime<Utc>) -> Result<BandState, ControllerError> {
        let candles = self
            .feed
            .fetch_daily_candles(&self.symbol, self.fetch_count)
            .await?;
        let (high, low) = compute_band(&candles, self.lookback)?;

        Ok(BandState {
            high,
            low,
            last_update: now,
        })
    }
}
