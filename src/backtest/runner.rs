use std::sync::Arc;

use serde::Serialize;

use crate::backtest::paper::PaperTrader;
use crate::config::S1Config;
use crate::controller::{PositionController, TickOutcome};
use crate::error::ControllerError;
use crate::models::TradeSide;

/// Results of one replay
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReplaySummary {
    pub ticks: usize,
    pub refreshes: usize,
    pub gate_open_refreshes: usize,
    pub idle_ticks: usize,
    pub aborted_ticks: usize,
    pub buys: usize,
    pub sells: usize,
    pub rejected: usize,
    pub failed: usize,
    pub start_price: f64,
    pub end_price: f64,
    pub start_value: f64,
    pub end_value: f64,
    pub final_position_ratio: f64,
}

impl ReplaySummary {
    pub fn trades(&self) -> usize {
        self.buys + self.sells
    }

    pub fn return_pct(&self) -> f64 {
        if self.start_value > 0.0 {
            (self.end_value - self.start_value) / self.start_value * 100.0
        } else {
            0.0
        }
    }
}

/// Steps a paper trader hour by hour and drives the controller the way the
/// live scheduler would: `refresh` whenever the band is due, a tick every hour
pub struct ReplayRunner {
    config: S1Config,
}

impl ReplayRunner {
    pub fn new(config: S1Config) -> Self {
        Self { config }
    }

    /// Hourly index where the first refresh can see a full lookback window
    pub fn warmup_hours(&self) -> usize {
        (self.config.lookback_days + 1) * 24
    }

    pub async fn run(&self, trader: Arc<PaperTrader>) -> Result<ReplaySummary, ControllerError> {
        let warmup = self.warmup_hours();
        if trader.len() <= warmup {
            return Err(ControllerError::InsufficientCandles {
                got: trader.len() / 24,
                needed: warmup / 24 + 1,
            });
        }

        let mut controller = PositionController::new(trader.clone(), self.config.clone())?;

        trader.set_cursor(warmup);
        let mut summary = ReplaySummary {
            start_price: trader.price().unwrap_or(0.0),
            start_value: trader.total_value(),
            ..Default::default()
        };

        tracing::info!(
            "Starting replay: {} hourly candles, warmup {} hours",
            trader.len(),
            warmup
        );

        for cursor in warmup..trader.len() {
            trader.set_cursor(cursor);
            let Some(now) = trader.now() else {
                break;
            };

            if controller.should_refresh(now) {
                let report = controller.refresh_at(now).await;
                summary.refreshes += 1;
                if report.allow_replenish {
                    summary.gate_open_refreshes += 1;
                }
            }

            summary.ticks += 1;
            match controller.check_and_execute().await {
                TickOutcome::Idle => summary.idle_ticks += 1,
                TickOutcome::Aborted(_) => summary.aborted_ticks += 1,
                TickOutcome::Hold(_) => {}
                TickOutcome::Rejected(_) => summary.rejected += 1,
                TickOutcome::Failed(_) => summary.failed += 1,
                TickOutcome::Executed(record) => match record.side {
                    TradeSide::Buy => summary.buys += 1,
                    TradeSide::Sell => summary.sells += 1,
                },
            }
        }

        summary.end_price = trader.price().unwrap_or(0.0);
        summary.end_value = trader.total_value();
        summary.final_position_ratio = if summary.end_value > 0.0 {
            trader.balances().1 * summary.end_price / summary.end_value
        } else {
            0.0
        };

        tracing::info!(
            "Replay complete: {} ticks, {} buys, {} sells, {:.2}% return",
            summary.ticks,
            summary.buys,
            summary.sells,
            summary.return_pct()
        );

        Ok(summary)
    }
}
