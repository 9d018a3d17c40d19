use crate::error::ControllerError;
use crate::models::SymbolLimits;

impl SymbolLimits {
    /// Check a rounded order against the exchange minimums
    pub fn check(&self, amount: f64, price: f64) -> Result<f64, ControllerError> {
        if !(amount > 0.0) || !amount.is_finite() {
            return Err(ControllerError::NonPositiveAmount(amount));
        }

        // Check minimum amount
        if amount < self.min_amount {
            return Err(ControllerError::BelowMinAmount {
                amount,
                min: self.min_amount,
            });
        }

        // Check minimum notional
        let notional = amount * price;
        if !notional.is_finite() || notional < self.min_notional {
            return Err(ControllerError::BelowMinNotional {
                notional,
                min: self.min_notional,
            });
        }

        Ok(notional)
    }
}
