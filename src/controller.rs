use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::S1Config;
use crate::error::ControllerError;
use crate::execution::{AdjustmentExecutor, AmountPrecision, FloorPrecision};
use crate::host::{MarketDataFeed, PortfolioView, TradingHost};
use crate::models::TradeRecord;
use crate::strategy::{
    BandState, Decision, LevelTracker, PortfolioSnapshot, RebalanceEngine, TrendAnalyzer,
    TrendState,
};

/// Result of a low-frequency refresh
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshReport {
    pub levels_updated: bool,
    pub trend: TrendState,
    pub allow_replenish: bool,
}

/// What happened on one tick
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No band yet, nothing to compare against
    Idle,
    /// Live state unreadable or invalid
    Aborted(String),
    /// Decision taken, no order needed
    Hold(Decision),
    /// Order refused by exchange limits before placement
    Rejected(String),
    /// Order placement failed
    Failed(String),
    Executed(TradeRecord),
}

/// Supplementary S1 position controller
///
/// Runs beside the grid engine and pushes the risky-asset allocation back toward
/// target whenever price leaves the 52-day band. Driven by an external scheduler:
/// `refresh` about once a day, `check_and_execute` every trading tick. The two are
/// never in flight together (`refresh` takes `&mut self`).
pub struct PositionController {
    config: S1Config,
    feed: Arc<dyn MarketDataFeed>,
    portfolio: Arc<dyn PortfolioView>,
    levels: LevelTracker,
    trend: TrendAnalyzer,
    engine: RebalanceEngine,
    executor: AdjustmentExecutor,
}

impl PositionController {
    pub fn new<H>(host: Arc<H>, config: S1Config) -> Result<Self, ControllerError>
    where
        H: TradingHost + 'static,
    {
        config.validate()?;

        let feed: Arc<dyn MarketDataFeed> = host.clone();
        let portfolio: Arc<dyn PortfolioView> = host.clone();

        let precision: Arc<dyn AmountPrecision> = match host.amount_precision() {
            Some(precision) => precision,
            None => {
                tracing::warn!(
                    "S1: host has no amount precision rule, flooring to {} decimals",
                    config.fallback_amount_decimals
                );
                Arc::new(FloorPrecision::new(config.fallback_amount_decimals))
            }
        };
        let limits = host.limits().unwrap_or_default();

        let executor =
            AdjustmentExecutor::new(host.clone(), precision, limits, config.strategy_tag.clone());

        tracing::info!(
            "S1 Position Controller initialized. Lookback={} days, Sell Target={}%, Buy Target={}%, \
             min notional={}, min amount={}",
            config.lookback_days,
            config.sell_target_pct * 100.0,
            config.buy_target_pct * 100.0,
            limits.min_notional,
            limits.min_amount
        );

        Ok(Self {
            levels: LevelTracker::new(feed.clone(), &config),
            trend: TrendAnalyzer::new(feed.clone(), &config),
            engine: RebalanceEngine::new(&config),
            executor,
            feed,
            portfolio,
            config,
        })
    }

    pub fn config(&self) -> &S1Config {
        &self.config
    }

    pub fn band(&self) -> Option<&BandState> {
        self.levels.band()
    }

    pub fn trend_state(&self) -> &TrendState {
        self.trend.state()
    }

    pub fn allow_replenish(&self) -> bool {
        self.trend.allow_replenish()
    }

    pub fn should_refresh(&self, now: DateTime<Utc>) -> bool {
        self.levels.should_refresh(now)
    }

    pub async fn refresh(&mut self) -> RefreshReport {
        self.refresh_at(Utc::now()).await
    }

    /// Update the band if due, then recompute the trend gate
    pub async fn refresh_at(&mut self, now: DateTime<Utc>) -> RefreshReport {
        let mut levels_updated = false;
        if self.levels.should_refresh(now) {
            tracing::info!("S1: time to update daily high/low levels");
            levels_updated = self.levels.refresh(now).await;
        }

        tracing::debug!("S1: updating trend analysis");
        let trend = *self.trend.refresh().await;

        RefreshReport {
            levels_updated,
            allow_replenish: trend.allow_replenish(),
            trend,
        }
    }

    /// High-frequency check: decide and, if needed, place one adjustment order
    pub async fn check_and_execute(&self) -> TickOutcome {
        let Some(band) = self.levels.band().copied() else {
            tracing::debug!("S1: daily high/low levels not available yet");
            return TickOutcome::Idle;
        };

        let snapshot = match self.snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                match &e {
                    ControllerError::Collaborator(_) => {
                        tracing::error!("S1: failed to get current state: {}", e)
                    }
                    _ => tracing::warn!("S1: {}", e),
                }
                return TickOutcome::Aborted(e.to_string());
            }
        };

        // Computed every refresh but not applied to the rule below
        tracing::debug!(
            allow_replenish = self.trend.allow_replenish(),
            "S1: trend gate (informational)"
        );

        let decision = match self.engine.decide(&band, &snapshot) {
            Ok(decision) => decision,
            Err(e) => {
                tracing::warn!("S1: {}", e);
                return TickOutcome::Aborted(e.to_string());
            }
        };

        let Some(side) = decision.action.side() else {
            tracing::debug!(
                "S1: no adjustment. price={:.4} high={:.4} low={:.4} pos={:.2}% ({})",
                snapshot.price,
                band.high,
                band.low,
                snapshot.position_ratio * 100.0,
                decision.reason
            );
            return TickOutcome::Hold(decision);
        };

        tracing::info!(
            "S1: {}. Need to {} {:.8} {}",
            decision.reason,
            side,
            decision.size,
            self.config.base_asset()
        );

        match self
            .executor
            .execute(side, decision.size, snapshot.price)
            .await
        {
            Ok(record) => TickOutcome::Executed(record),
            Err(e) if e.is_limit_violation() => {
                tracing::warn!("S1: order rejected: {}", e);
                TickOutcome::Rejected(e.to_string())
            }
            Err(e) => {
                tracing::error!(
                    "S1: failed to execute adjustment order ({} {:.8}): {}",
                    side,
                    decision.size,
                    e
                );
                TickOutcome::Failed(e.to_string())
            }
        }
    }

    async fn snapshot(&self) -> Result<PortfolioSnapshot, ControllerError> {
        let price = self.feed.current_price().await?.unwrap_or(0.0);
        if !(price > 0.0) {
            return Err(ControllerError::InvalidPrice(price));
        }

        let position_ratio = self.portfolio.position_ratio().await?;
        let position_value = self.portfolio.position_value().await?;
        let total_assets = self.portfolio.total_assets().await?;
        let available_balance = self
            .portfolio
            .available_balance(self.config.base_asset())
            .await?;

        if !(total_assets > 0.0) {
            return Err(ControllerError::InvalidTotalAssets(total_assets));
        }

        for (field, value) in [
            ("position_ratio", position_ratio),
            ("position_value", position_value),
            ("available_balance", available_balance),
        ] {
            if !value.is_finite() {
                return Err(ControllerError::InvalidPortfolioState { field, value });
            }
        }

        Ok(PortfolioSnapshot {
            price,
            position_ratio,
            position_value,
            total_assets,
            available_balance,
        })
    }
}
