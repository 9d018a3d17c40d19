use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::backtest::synthetic::{aggregate_daily, merge_candles};
use crate::execution::AmountPrecision;
use crate::host::{MarketDataFeed, OrderGateway, PortfolioView, SymbolMetadata};
use crate::indicators::{calculate_ema, calculate_macd};
use crate::models::{Candle, OrderFill, SymbolLimits, TradeRecord, TradeSide};

/// Hourly closes fed into the hourly indicators
const INDICATOR_WINDOW: usize = 300;

struct PaperState {
    cursor: usize,
    quote: f64,
    base: f64,
    orders_placed: u64,
    journal: Vec<TradeRecord>,
}

/// In-memory trading host over a pre-generated hourly series
///
/// The cursor is "now": the current price is the close of the hourly candle under
/// it, and the daily series ends with today's in-progress candle.
pub struct PaperTrader {
    base_asset: String,
    hourly: Vec<Candle>,
    daily: Vec<Candle>,
    fee_rate: f64,
    limits: Option<SymbolLimits>,
    precision: Option<Arc<dyn AmountPrecision>>,
    state: Mutex<PaperState>,
}

impl PaperTrader {
    pub fn new(base_asset: impl Into<String>, hourly: Vec<Candle>, quote: f64, base: f64) -> Self {
        let daily = aggregate_daily(&hourly);
        Self {
            base_asset: base_asset.into(),
            hourly,
            daily,
            fee_rate: 0.001,
            limits: Some(SymbolLimits::default()),
            precision: None,
            state: Mutex::new(PaperState {
                cursor: 0,
                quote,
                base,
                orders_placed: 0,
                journal: Vec::new(),
            }),
        }
    }

    pub fn with_fee_rate(mut self, fee_rate: f64) -> Self {
        self.fee_rate = fee_rate;
        self
    }

    pub fn with_limits(mut self, limits: Option<SymbolLimits>) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_precision(mut self, precision: Arc<dyn AmountPrecision>) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn len(&self) -> usize {
        self.hourly.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hourly.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.lock().cursor
    }

    /// Move the clock to hourly candle `cursor` (clamped to the series)
    pub fn set_cursor(&self, cursor: usize) {
        let last = self.hourly.len().saturating_sub(1);
        self.lock().cursor = cursor.min(last);
    }

    pub fn now(&self) -> Option<DateTime<Utc>> {
        self.hourly.get(self.cursor()).map(|c| c.timestamp)
    }

    pub fn price(&self) -> Option<f64> {
        self.hourly.get(self.cursor()).map(|c| c.close)
    }

    pub fn balances(&self) -> (f64, f64) {
        let state = self.lock();
        (state.quote, state.base)
    }

    pub fn total_value(&self) -> f64 {
        let (quote, base) = self.balances();
        quote + base * self.price().unwrap_or(0.0)
    }

    pub fn trades(&self) -> Vec<TradeRecord> {
        self.lock().journal.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PaperState> {
        // Poisoning only happens if a holder panicked; the balances are still usable
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn hourly_closes(&self) -> Vec<f64> {
        let end = self.cursor() + 1;
        let start = end.saturating_sub(INDICATOR_WINDOW);
        self.hourly[start..end].iter().map(|c| c.close).collect()
    }

    /// Completed days plus today's partial candle
    fn visible_daily(&self) -> Vec<Candle> {
        let cursor = self.cursor();
        let day = cursor / 24;
        let mut candles: Vec<Candle> = self.daily.iter().take(day).cloned().collect();
        if let Some(today) = merge_candles(&self.hourly[day * 24..=cursor]) {
            candles.push(today);
        }
        candles
    }
}

#[async_trait]
impl MarketDataFeed for PaperTrader {
    async fn fetch_daily_candles(&self, _symbol: &str, count: usize) -> anyhow::Result<Vec<Candle>> {
        if self.is_empty() {
            anyhow::bail!("no market data loaded");
        }
        let candles = self.visible_daily();
        let skip = candles.len().saturating_sub(count);
        Ok(candles.into_iter().skip(skip).collect())
    }

    async fn fetch_hourly_mas(
        &self,
        short_period: usize,
        long_period: usize,
    ) -> anyhow::Result<Option<(f64, f64)>> {
        if self.is_empty() {
            return Ok(None);
        }
        let closes = self.hourly_closes();
        Ok(calculate_ema(&closes, short_period).zip(calculate_ema(&closes, long_period)))
    }

    async fn fetch_macd(&self) -> anyhow::Result<Option<(f64, f64)>> {
        if self.is_empty() {
            return Ok(None);
        }
        let closes = self.hourly_closes();
        Ok(calculate_macd(&closes, 12, 26, 9).map(|m| (m.macd_line, m.signal_line)))
    }

    async fn current_price(&self) -> anyhow::Result<Option<f64>> {
        Ok(self.price())
    }
}

#[async_trait]
impl PortfolioView for PaperTrader {
    async fn position_ratio(&self) -> anyhow::Result<f64> {
        let total = self.total_value();
        if total <= 0.0 {
            return Ok(0.0);
        }
        let (_, base) = self.balances();
        Ok(base * self.price().unwrap_or(0.0) / total)
    }

    async fn position_value(&self) -> anyhow::Result<f64> {
        let (_, base) = self.balances();
        Ok(base * self.price().unwrap_or(0.0))
    }

    async fn total_assets(&self) -> anyhow::Result<f64> {
        Ok(self.total_value())
    }

    async fn available_balance(&self, asset: &str) -> anyhow::Result<f64> {
        let (quote, base) = self.balances();
        Ok(if asset == self.base_asset { base } else { quote })
    }
}

#[async_trait]
impl OrderGateway for PaperTrader {
    async fn execute_order(&self, side: TradeSide, target_notional: f64) -> anyhow::Result<OrderFill> {
        let price = self
            .price()
            .ok_or_else(|| anyhow::anyhow!("no price at cursor"))?;
        let amount = target_notional / price;
        let fee = target_notional * self.fee_rate;

        let mut state = self.lock();
        match side {
            TradeSide::Buy => {
                if state.quote < target_notional + fee {
                    anyhow::bail!(
                        "insufficient quote balance: have {:.2}, need {:.2}",
                        state.quote,
                        target_notional + fee
                    );
                }
                state.quote -= target_notional + fee;
                state.base += amount;
            }
            TradeSide::Sell => {
                if state.base + 1e-12 < amount {
                    anyhow::bail!(
                        "insufficient {} balance: have {:.8}, need {:.8}",
                        self.base_asset,
                        state.base,
                        amount
                    );
                }
                state.base = (state.base - amount).max(0.0);
                state.quote += target_notional - fee;
            }
        }
        state.orders_placed += 1;

        Ok(OrderFill {
            id: format!("paper-{}", state.orders_placed),
            price: Some(price),
            filled: Some(amount),
            cost: Some(target_notional),
            fee: Some(fee),
        })
    }

    async fn record_trade(&self, record: &TradeRecord) -> anyhow::Result<()> {
        self.lock().journal.push(record.clone());
        Ok(())
    }
}

impl SymbolMetadata for PaperTrader {
    fn limits(&self) -> Option<SymbolLimits> {
        self.limits
    }

    fn amount_precision(&self) -> Option<Arc<dyn AmountPrecision>> {
        self.precision.clone()
    }
}
