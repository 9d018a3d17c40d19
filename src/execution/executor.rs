use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::error::ControllerError;
use crate::execution::AmountPrecision;
use crate::host::OrderGateway;
use crate::models::{SymbolLimits, TradeRecord, TradeSide};

/// Turns a rebalance decision into a limit-compliant order
///
/// Only places independent orders; the primary strategy's reference price is
/// never touched from here.
pub struct AdjustmentExecutor {
    gateway: Arc<dyn OrderGateway>,
    precision: Arc<dyn AmountPrecision>,
    limits: SymbolLimits,
    strategy_tag: String,
}

impl AdjustmentExecutor {
    pub fn new(
        gateway: Arc<dyn OrderGateway>,
        precision: Arc<dyn AmountPrecision>,
        limits: SymbolLimits,
        strategy_tag: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            precision,
            limits,
            strategy_tag: strategy_tag.into(),
        }
    }

    /// Round, validate and place one adjustment order
    ///
    /// Limit violations come back as errors without the gateway being called.
    pub async fn execute(
        &self,
        side: TradeSide,
        raw_amount: f64,
        current_price: f64,
    ) -> Result<TradeRecord, ControllerError> {
        let amount = self.precision.adjust(raw_amount);
        if !(amount > 0.0) || !amount.is_finite() {
            return Err(ControllerError::NonPositiveAmount(amount));
        }

        if !(current_price > 0.0) {
            return Err(ControllerError::InvalidPrice(current_price));
        }

        let notional = self.limits.check(amount, current_price)?;

        tracing::info!(
            "S1: attempting to {} {:.8} (approx {:.2} quote)",
            side,
            amount,
            notional
        );

        let fill = self.gateway.execute_order(side, notional).await?;
        if fill.id.is_empty() {
            return Err(ControllerError::OrderNotFilled(format!(
                "{} {:.8} returned no order id",
                side, amount
            )));
        }

        let record = TradeRecord {
            id: Uuid::new_v4(),
            order_id: fill.id.clone(),
            strategy: self.strategy_tag.clone(),
            side,
            price: fill.price.unwrap_or(current_price),
            amount: fill.filled.unwrap_or(amount),
            cost: fill.cost.unwrap_or(notional),
            fee: fill.fee.unwrap_or(0.0),
            timestamp: Utc::now(),
        };

        tracing::info!(
            order_id = %record.order_id,
            "S1: adjustment order placed - price: {:.4}, amount: {:.8}, cost: {:.2}",
            record.price,
            record.amount,
            record.cost
        );

        if let Err(e) = self.gateway.record_trade(&record).await {
            tracing::warn!("S1: failed to journal trade {}: {}", record.order_id, e);
        }

        Ok(record)
    }
}
