use std::sync::Arc;

use crate::config::S1Config;
use crate::host::MarketDataFeed;
use crate::models::TrendSignal;

/// Three independent trend readings
///
/// `allow_replenish` is derived: all three must be known and bullish.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrendState {
    /// 12 EMA vs 26 EMA on the hourly series
    pub short: TrendSignal,
    /// MACD histogram on the hourly series
    pub mid: TrendSignal,
    /// Current price vs 200 EMA on the daily series
    pub long: TrendSignal,
}

impl TrendState {
    pub fn allow_replenish(&self) -> bool {
        self.short.is_bullish() && self.mid.is_bullish() && self.long.is_bullish()
    }
}

/// Multi-timeframe trend confirmation
pub struct TrendAnalyzer {
    feed: Arc<dyn MarketDataFeed>,
    symbol: String,
    short_period: usize,
    long_period: usize,
    long_trend_period: usize,
    long_trend_fetch: usize,
    state: TrendState,
}

impl TrendAnalyzer {
    pub fn new(feed: Arc<dyn MarketDataFeed>, config: &S1Config) -> Self {
        Self {
            feed,
            symbol: config.symbol.clone(),
            short_period: config.short_ema_period,
            long_period: config.long_ema_period,
            long_trend_period: config.long_trend_ema_period,
            long_trend_fetch: config.long_trend_fetch_count(),
            state: TrendState::default(),
        }
    }

    pub fn state(&self) -> &TrendState {
        &self.state
    }

    pub fn allow_replenish(&self) -> bool {
        self.state.allow_replenish()
    }

    /// Recompute all three signals and replace the state in one step
    ///
    /// Any collaborator error resets the state to all-unknown, which closes the gate.
    pub async fn refresh(&mut self) -> &TrendState {
        self.state = match self.analyze().await {
            Ok(state) => state,
            Err(e) => {
                tracing::error!("S1: trend analysis failed: {:#}", e);
                TrendState::default()
            }
        };

        if self.state.allow_replenish() {
            tracing::info!("Trend resonance: short, mid and long all bullish, replenish allowed");
        } else {
            tracing::info!(
                short = %self.state.short,
                mid = %self.state.mid,
                long = %self.state.long,
                "Trend resonance not reached, replenish not allowed"
            );
        }

        &self.state
    }

    async fn analyze(&self) -> anyhow::Result<TrendState> {
        Ok(TrendState {
            short: self.short_term().await?,
            mid: self.mid_term().await?,
            long: self.long_term().await?,
        })
    }

    async fn short_term(&self) -> anyhow::Result<TrendSignal> {
        let signal = match self
            .feed
            .fetch_hourly_mas(self.short_period, self.long_period)
            .await?
        {
            Some((short_ma, long_ma)) => {
                tracing::debug!(
                    "Trend short (1h EMA{} > EMA{}): {} (EMA{}: {:.4}, EMA{}: {:.4})",
                    self.short_period,
                    self.long_period,
                    short_ma > long_ma,
                    self.short_period,
                    short_ma,
                    self.long_period,
                    long_ma
                );
                TrendSignal::from_bool(short_ma > long_ma)
            }
            None => TrendSignal::Unknown,
        };
        Ok(signal)
    }

    async fn mid_term(&self) -> anyhow::Result<TrendSignal> {
        let signal = match self.feed.fetch_macd().await? {
            Some((macd_line, signal_line)) => {
                let histogram = macd_line - signal_line;
                tracing::debug!(
                    "Trend mid (1h MACD hist > 0): {} (MACD: {:.4}, signal: {:.4}, hist: {:.4})",
                    histogram > 0.0,
                    macd_line,
                    signal_line,
                    histogram
                );
                TrendSignal::from_bool(histogram > 0.0)
            }
            None => TrendSignal::Unknown,
        };
        Ok(signal)
    }

    async fn long_term(&self) -> anyhow::Result<TrendSignal> {
        let price = self.feed.current_price().await?;
        let candles = self
            .feed
            .fetch_daily_candles(&self.symbol, self.long_trend_fetch)
            .await?;

        let price = match price {
            Some(p) if p > 0.0 && p.is_finite() && candles.len() >= self.long_trend_period => p,
            _ => {
                tracing::warn!(
                    "Trend long: insufficient data for {}D EMA or current price unavailable \
                     (daily candles: {}, price: {:?})",
                    self.long_trend_period,
                    candles.len(),
                    price
                );
                return Ok(TrendSignal::Unknown);
            }
        };

        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let signal = match self.feed.compute_ema(&closes, self.long_trend_period) {
            Some(ema) if ema != 0.0 => {
                tracing::debug!(
                    "Trend long (price > {}D EMA): {} (price: {:.4}, EMA: {:.4})",
                    self.long_trend_period,
                    price > ema,
                    price,
                    ema
                );
                TrendSignal::from_bool(price > ema)
            }
            _ => TrendSignal::Unknown,
        };
        Ok(signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Candle;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};

    #[derive(Clone)]
    struct IndicatorFeed {
        mas: Option<(f64, f64)>,
        macd: Option<(f64, f64)>,
        price: Option<f64>,
        daily_closes: Vec<f64>,
        fail_macd: bool,
    }

    impl IndicatorFeed {
        fn all_bullish() -> Self {
            Self {
                mas: Some((105.0, 100.0)),
                macd: Some((1.5, 1.0)),
                price: Some(150.0),
                daily_closes: vec![100.0; 250],
                fail_macd: false,
            }
        }
    }

    #[async_trait]
    impl MarketDataFeed for IndicatorFeed {
        async fn fetch_daily_candles(&self, _symbol: &str, count: usize) -> anyhow::Result<Vec<Candle>> {
            let start = Utc::now() - Duration::days(self.daily_closes.len() as i64);
            Ok(self
                .daily_closes
                .iter()
                .rev()
                .take(count)
                .rev()
                .enumerate()
                .map(|(i, &close)| Candle {
                    timestamp: start + Duration::days(i as i64),
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume: 1.0,
                })
                .collect())
        }

        async fn fetch_hourly_mas(&self, _s: usize, _l: usize) -> anyhow::Result<Option<(f64, f64)>> {
            Ok(self.mas)
        }

        async fn fetch_macd(&self) -> anyhow::Result<Option<(f64, f64)>> {
            if self.fail_macd {
                anyhow::bail!("indicator service down");
            }
            Ok(self.macd)
        }

        async fn current_price(&self) -> anyhow::Result<Option<f64>> {
            Ok(self.price)
        }
    }

    async fn analyze(feed: IndicatorFeed) -> TrendState {
        let mut analyzer = TrendAnalyzer::new(Arc::new(feed), &S1Config::default());
        *analyzer.refresh().await
    }

    #[test]
    fn test_allow_replenish_truth_table() {
        let signals = [TrendSignal::Bullish, TrendSignal::Bearish, TrendSignal::Unknown];
        for short in signals {
            for mid in signals {
                for long in signals {
                    let state = TrendState { short, mid, long };
                    let expected = short == TrendSignal::Bullish
                        && mid == TrendSignal::Bullish
                        && long == TrendSignal::Bullish;
                    assert_eq!(state.allow_replenish(), expected, "{:?}", state);
                }
            }
        }
    }

    #[test]
    fn test_default_state_is_closed() {
        let state = TrendState::default();
        assert_eq!(state.short, TrendSignal::Unknown);
        assert!(!state.allow_replenish());
    }

    #[tokio::test]
    async fn test_all_bullish_opens_gate() {
        let state = analyze(IndicatorFeed::all_bullish()).await;
        assert_eq!(state.short, TrendSignal::Bullish);
        assert_eq!(state.mid, TrendSignal::Bullish);
        assert_eq!(state.long, TrendSignal::Bullish);
        assert!(state.allow_replenish());
    }

    #[tokio::test]
    async fn test_bearish_short_term_closes_gate() {
        let feed = IndicatorFeed {
            mas: Some((95.0, 100.0)),
            ..IndicatorFeed::all_bullish()
        };
        let state = analyze(feed).await;
        assert_eq!(state.short, TrendSignal::Bearish);
        assert!(!state.allow_replenish());
    }

    #[tokio::test]
    async fn test_missing_macd_is_unknown() {
        let feed = IndicatorFeed {
            macd: None,
            ..IndicatorFeed::all_bullish()
        };
        let state = analyze(feed).await;
        assert_eq!(state.mid, TrendSignal::Unknown);
        assert_eq!(state.short, TrendSignal::Bullish);
        assert!(!state.allow_replenish());
    }

    #[tokio::test]
    async fn test_long_term_unknown_without_enough_history() {
        let feed = IndicatorFeed {
            daily_closes: vec![100.0; 150],
            ..IndicatorFeed::all_bullish()
        };
        let state = analyze(feed).await;
        assert_eq!(state.long, TrendSignal::Unknown);
    }

    #[tokio::test]
    async fn test_long_term_unknown_without_price() {
        let feed = IndicatorFeed {
            price: None,
            ..IndicatorFeed::all_bullish()
        };
        let state = analyze(feed).await;
        assert_eq!(state.long, TrendSignal::Unknown);
    }

    #[tokio::test]
    async fn test_long_term_unknown_on_unusable_price() {
        for price in [0.0, -5.0, f64::NAN] {
            let feed = IndicatorFeed {
                price: Some(price),
                ..IndicatorFeed::all_bullish()
            };
            let state = analyze(feed).await;
            assert_eq!(state.long, TrendSignal::Unknown, "price {}", price);
        }
    }

    #[tokio::test]
    async fn test_long_term_unknown_on_zero_ema() {
        let feed = IndicatorFeed {
            daily_closes: vec![0.0; 250],
            ..IndicatorFeed::all_bullish()
        };
        let state = analyze(feed).await;
        assert_eq!(state.long, TrendSignal::Unknown);
    }

    #[tokio::test]
    async fn test_long_term_bearish_below_ema() {
        let feed = IndicatorFeed {
            price: Some(80.0),
            ..IndicatorFeed::all_bullish()
        };
        let state = analyze(feed).await;
        assert_eq!(state.long, TrendSignal::Bearish);
    }

    #[tokio::test]
    async fn test_collaborator_error_resets_state() {
        let mut analyzer = TrendAnalyzer::new(
            Arc::new(IndicatorFeed::all_bullish()),
            &S1Config::default(),
        );
        assert!(analyzer.refresh().await.allow_replenish());

        // Swap in a failing feed; previous bullish readings must not survive
        analyzer.feed = Arc::new(IndicatorFeed {
            fail_macd: true,
            ..IndicatorFeed::all_bullish()
        });
        let state = *analyzer.refresh().await;
        assert_eq!(state, TrendState::default());
        assert!(!analyzer.allow_replenish());
    }
}
