use crate::config::S1Config;
use crate::error::ControllerError;
use crate::models::TradeSide;
use crate::strategy::BandState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebalanceAction {
    Hold,
    Buy,
    Sell,
}

impl RebalanceAction {
    pub fn side(&self) -> Option<TradeSide> {
        match self {
            RebalanceAction::Hold => None,
            RebalanceAction::Buy => Some(TradeSide::Buy),
            RebalanceAction::Sell => Some(TradeSide::Sell),
        }
    }
}

/// Per-tick decision, never persisted
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub action: RebalanceAction,
    /// Trade size in base asset, zero for `Hold`
    pub size: f64,
    pub reason: String,
}

impl Decision {
    fn hold(reason: impl Into<String>) -> Self {
        Self {
            action: RebalanceAction::Hold,
            size: 0.0,
            reason: reason.into(),
        }
    }
}

/// Live portfolio readings for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortfolioSnapshot {
    pub price: f64,
    pub position_ratio: f64,
    pub position_value: f64,
    pub total_assets: f64,
    pub available_balance: f64,
}

/// Band-breach rebalancing rule
///
/// Above the band with too much exposure: sell down toward `sell_target_pct`.
/// Below the band with too little: buy up toward `buy_target_pct`. The high
/// side is checked first and at most one action comes out per tick.
#[derive(Debug, Clone)]
pub struct RebalanceEngine {
    sell_target_pct: f64,
    buy_target_pct: f64,
    min_trade_size: f64,
}

impl RebalanceEngine {
    pub fn new(config: &S1Config) -> Self {
        Self {
            sell_target_pct: config.sell_target_pct,
            buy_target_pct: config.buy_target_pct,
            min_trade_size: config.min_trade_size,
        }
    }

    /// Decide what to do this tick
    ///
    /// Errors only on invalid live state (non-positive price or total assets);
    /// the caller aborts the tick.
    pub fn decide(
        &self,
        band: &BandState,
        snapshot: &PortfolioSnapshot,
    ) -> Result<Decision, ControllerError> {
        if !(snapshot.price > 0.0) {
            return Err(ControllerError::InvalidPrice(snapshot.price));
        }
        if !(snapshot.total_assets > 0.0) {
            return Err(ControllerError::InvalidTotalAssets(snapshot.total_assets));
        }

        let price = snapshot.price;

        let decision = if price > band.high && snapshot.position_ratio > self.sell_target_pct {
            let target_value = snapshot.total_assets * self.sell_target_pct;
            let sell_value = snapshot.position_value - target_value;
            if !(sell_value > 0.0) {
                Decision::hold(format!(
                    "High breached but sell value {:.2} is not positive",
                    sell_value
                ))
            } else {
                let size = (sell_value / price).min(snapshot.available_balance);
                Decision {
                    action: RebalanceAction::Sell,
                    size,
                    reason: format!(
                        "High {:.4} breached at {:.4}, selling toward {:.0}% target",
                        band.high,
                        price,
                        self.sell_target_pct * 100.0
                    ),
                }
            }
        } else if price < band.low && snapshot.position_ratio < self.buy_target_pct {
            let target_value = snapshot.total_assets * self.buy_target_pct;
            let buy_value = target_value - snapshot.position_value;
            if !(buy_value > 0.0) {
                Decision::hold(format!(
                    "Low breached but buy value {:.2} is not positive",
                    buy_value
                ))
            } else {
                Decision {
                    action: RebalanceAction::Buy,
                    size: buy_value / price,
                    reason: format!(
                        "Low {:.4} breached at {:.4}, buying toward {:.0}% target",
                        band.low,
                        price,
                        self.buy_target_pct * 100.0
                    ),
                }
            }
        } else {
            Decision::hold("Price inside band or allocation already on target side")
        };

        if decision.action != RebalanceAction::Hold && !(decision.size > self.min_trade_size) {
            return Ok(Decision::hold(format!(
                "Size {:.12} is dust, skipping",
                decision.size
            )));
        }

        Ok(decision)
    }
}
