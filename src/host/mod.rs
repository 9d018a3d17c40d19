//! Host Trading System Contract
//!
//! The controller never talks to an exchange directly. Everything it needs from the
//! primary trading engine is expressed here as traits, injected at construction:
//!
//! - [`MarketDataFeed`]: candles, indicator readings, current price
//! - [`PortfolioView`]: allocation and balances
//! - [`OrderGateway`]: order placement and trade bookkeeping
//! - [`SymbolMetadata`]: optional exchange capabilities (limits, amount precision)
//!
//! A host implementing all four is a [`TradingHost`].

use std::sync::Arc;

use async_trait::async_trait;

use crate::execution::AmountPrecision;
use crate::indicators::calculate_ema;
use crate::models::{Candle, OrderFill, SymbolLimits, TradeRecord, TradeSide};

/// Price and indicator data
#[async_trait]
pub trait MarketDataFeed: Send + Sync {
    /// Daily candles, oldest first. The last one may still be in progress.
    async fn fetch_daily_candles(&self, symbol: &str, count: usize) -> anyhow::Result<Vec<Candle>>;

    /// Short and long EMA on the hourly series, `None` if unavailable
    async fn fetch_hourly_mas(
        &self,
        short_period: usize,
        long_period: usize,
    ) -> anyhow::Result<Option<(f64, f64)>>;

    /// MACD line and signal line on the hourly series, `None` if unavailable
    async fn fetch_macd(&self) -> anyhow::Result<Option<(f64, f64)>>;

    /// Latest traded price, `None` if unknown
    async fn current_price(&self) -> anyhow::Result<Option<f64>>;

    /// EMA over closing prices. Hosts with their own indicator stack may override.
    fn compute_ema(&self, closes: &[f64], period: usize) -> Option<f64> {
        calculate_ema(closes, period)
    }
}

/// Portfolio allocation of the risky asset
#[async_trait]
pub trait PortfolioView: Send + Sync {
    /// Fraction of total assets held in the risky asset
    async fn position_ratio(&self) -> anyhow::Result<f64>;

    /// Value of the risky-asset holding in quote currency
    async fn position_value(&self) -> anyhow::Result<f64>;

    /// Total portfolio value in quote currency
    async fn total_assets(&self) -> anyhow::Result<f64>;

    /// Free balance of `asset`
    async fn available_balance(&self, asset: &str) -> anyhow::Result<f64>;
}

/// Order placement
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Place an order worth `target_notional` in quote currency.
    /// Balance checks and fund transfers are the host's job.
    async fn execute_order(&self, side: TradeSide, target_notional: f64)
        -> anyhow::Result<OrderFill>;

    /// Journal a strategy-tagged trade. Hosts that journal inside
    /// `execute_order` can leave this as a no-op.
    async fn record_trade(&self, _record: &TradeRecord) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Optional exchange capabilities, resolved once when the controller is built
pub trait SymbolMetadata: Send + Sync {
    fn limits(&self) -> Option<SymbolLimits> {
        None
    }

    fn amount_precision(&self) -> Option<Arc<dyn AmountPrecision>> {
        None
    }
}

/// Full collaborator set the controller is built from
pub trait TradingHost: MarketDataFeed + PortfolioView + OrderGateway + SymbolMetadata {}

impl<T> TradingHost for T where T: MarketDataFeed + PortfolioView + OrderGateway + SymbolMetadata {}
